use serde::Serialize;

use crate::error::EditResult;
use crate::plan::BatchPlan;

/// A document listed in a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: String,
    pub name: String,
    pub url: String,
    pub modified_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub content: Option<String>,
    pub resolved: bool,
    pub created_time: Option<String>,
    pub quoted_text: Option<String>,
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub author: Option<String>,
    pub content: Option<String>,
    pub created_time: Option<String>,
}

/// Remote storage of folders, documents and comments.
///
/// Implementations do no markdown work; they move already compiled batches
/// and raw exports across the wire.
pub trait DocumentStore {
    /// Id of the folder named `name` directly under `parent`, if any.
    fn find_folder(&self, parent: &str, name: &str) -> EditResult<Option<String>>;

    fn create_folder(&self, parent: &str, name: &str) -> EditResult<String>;

    /// Create an empty document in `parent` and return its id.
    fn create_document(&self, parent: &str, title: &str) -> EditResult<String>;

    /// End index of the last element in the document body, `None` when the
    /// body has no elements.
    fn body_end_index(&self, document_id: &str) -> EditResult<Option<usize>>;

    /// Apply every request of `plan` atomically.
    fn batch_update(&self, document_id: &str, plan: &BatchPlan) -> EditResult<()>;

    fn export_html(&self, document_id: &str) -> EditResult<String>;

    /// Documents in `parent`, most recently modified first.
    fn list_documents(&self, parent: &str) -> EditResult<Vec<DocumentSummary>>;

    fn list_comments(&self, document_id: &str) -> EditResult<Vec<Comment>>;

    fn create_reply(&self, document_id: &str, comment_id: &str, content: &str) -> EditResult<()>;

    fn resolve_comment(&self, document_id: &str, comment_id: &str) -> EditResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn find_folder(&self, parent: &str, name: &str) -> EditResult<Option<String>> {
        (**self).find_folder(parent, name)
    }

    fn create_folder(&self, parent: &str, name: &str) -> EditResult<String> {
        (**self).create_folder(parent, name)
    }

    fn create_document(&self, parent: &str, title: &str) -> EditResult<String> {
        (**self).create_document(parent, title)
    }

    fn body_end_index(&self, document_id: &str) -> EditResult<Option<usize>> {
        (**self).body_end_index(document_id)
    }

    fn batch_update(&self, document_id: &str, plan: &BatchPlan) -> EditResult<()> {
        (**self).batch_update(document_id, plan)
    }

    fn export_html(&self, document_id: &str) -> EditResult<String> {
        (**self).export_html(document_id)
    }

    fn list_documents(&self, parent: &str) -> EditResult<Vec<DocumentSummary>> {
        (**self).list_documents(parent)
    }

    fn list_comments(&self, document_id: &str) -> EditResult<Vec<Comment>> {
        (**self).list_comments(document_id)
    }

    fn create_reply(&self, document_id: &str, comment_id: &str, content: &str) -> EditResult<()> {
        (**self).create_reply(document_id, comment_id, content)
    }

    fn resolve_comment(&self, document_id: &str, comment_id: &str) -> EditResult<()> {
        (**self).resolve_comment(document_id, comment_id)
    }
}
