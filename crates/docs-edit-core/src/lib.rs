pub mod auth;
pub mod content;
pub mod diff;
pub mod document;
pub mod error;
pub mod export;
pub mod google;
pub mod plan;
pub mod service;
pub mod store;
pub mod wire;

pub use auth::{Credentials, ServiceAccountKey, TokenSource};
pub use content::{load_content, ContentSource};
pub use document::{document_url, parse_doc_id};
pub use error::{EditError, EditResult, ExitCode};
pub use google::{Endpoints, GoogleDocs};
pub use plan::{BatchPlan, BatchRequest};
pub use service::{
    CreatedDocument, DocsService, ServiceSettings, UpdateOutcome, DEFAULT_MAX_CONTENT_CHARS,
};
pub use store::{Comment, DocumentStore, DocumentSummary, Reply};
pub use wire::BatchUpdateBody;
