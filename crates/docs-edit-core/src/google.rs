//! [`DocumentStore`] over the Google Drive v3 and Docs v1 REST APIs.

use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::auth::{Credentials, TokenSource};
use crate::document::document_url;
use crate::error::{EditError, EditResult};
use crate::plan::BatchPlan;
use crate::store::{Comment, DocumentStore, DocumentSummary, Reply};
use crate::wire::BatchUpdateBody;

pub const DEFAULT_DOCS_ENDPOINT: &str = "https://docs.googleapis.com/v1";
pub const DEFAULT_DRIVE_ENDPOINT: &str = "https://www.googleapis.com/drive/v3";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const DOCUMENT_MIME: &str = "application/vnd.google-apps.document";
const COMMENT_FIELDS: &str = "nextPageToken,comments(id,author/displayName,content,resolved,\
createdTime,modifiedTime,quotedFileContent/value,replies(id,author/displayName,content,createdTime))";

/// Base URLs of the two APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub docs: String,
    pub drive: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            docs: DEFAULT_DOCS_ENDPOINT.to_string(),
            drive: DEFAULT_DRIVE_ENDPOINT.to_string(),
        }
    }
}

pub struct GoogleDocs {
    client: Client,
    endpoints: Endpoints,
    tokens: TokenSource,
}

impl GoogleDocs {
    /// Credentials are only used once a request is made, so a server can
    /// start and report a missing credential per call.
    pub fn new(endpoints: Endpoints, credentials: Credentials) -> EditResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("docs-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoints: Endpoints {
                docs: endpoints.docs.trim_end_matches('/').to_string(),
                drive: endpoints.drive.trim_end_matches('/').to_string(),
            },
            tokens: TokenSource::new(credentials),
        })
    }

    /// Fetched per request; service-account tokens refresh as they expire.
    fn token(&self) -> EditResult<String> {
        self.tokens.token(&self.client)
    }

    fn drive_url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoints.drive)
    }

    fn docs_url(&self, path: &str) -> String {
        format!("{}/{path}", self.endpoints.docs)
    }

    fn send(&self, request: RequestBuilder) -> EditResult<String> {
        let response = request.bearer_auth(self.token()?).send()?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            let message = remote_error_message(&body);
            warn!("Google API request failed with {}: {}", status, message);
            return Err(EditError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> EditResult<T> {
        let body = self.send(request)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn list_files(&self, query: &str, fields: &str) -> EditResult<Vec<DriveFile>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.client.get(self.drive_url("files")).query(&[
                ("q", query),
                ("fields", fields),
                ("orderBy", "modifiedTime desc"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: FileList = self.send_json(request)?;
            files.extend(page.files);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    fn create_file(&self, parent: &str, name: &str, mime_type: &str) -> EditResult<String> {
        let request = self
            .client
            .post(self.drive_url("files"))
            .query(&[("fields", "id"), ("supportsAllDrives", "true")])
            .json(&json!({
                "name": name,
                "mimeType": mime_type,
                "parents": [parent],
            }));
        let created: CreatedFile = self.send_json(request)?;
        debug!("Created {} '{}' as {}", mime_type, name, created.id);
        Ok(created.id)
    }
}

impl DocumentStore for GoogleDocs {
    fn find_folder(&self, parent: &str, name: &str) -> EditResult<Option<String>> {
        let files = self.list_files(&folder_query(parent, name), "nextPageToken,files(id)")?;
        Ok(files.into_iter().next().map(|file| file.id))
    }

    fn create_folder(&self, parent: &str, name: &str) -> EditResult<String> {
        self.create_file(parent, name, FOLDER_MIME)
    }

    fn create_document(&self, parent: &str, title: &str) -> EditResult<String> {
        self.create_file(parent, title, DOCUMENT_MIME)
    }

    fn body_end_index(&self, document_id: &str) -> EditResult<Option<usize>> {
        let request = self
            .client
            .get(self.docs_url(&format!("documents/{document_id}")))
            .query(&[("fields", "body/content/endIndex")]);
        let document: DocumentResource = self.send_json(request)?;
        Ok(document
            .body
            .content
            .last()
            .and_then(|element| element.end_index))
    }

    fn batch_update(&self, document_id: &str, plan: &BatchPlan) -> EditResult<()> {
        debug!(
            "Sending batch of {} requests to document {}",
            plan.len(),
            document_id
        );
        let request = self
            .client
            .post(self.docs_url(&format!("documents/{document_id}:batchUpdate")))
            .json(&BatchUpdateBody::from(plan));
        self.send(request)?;
        Ok(())
    }

    fn export_html(&self, document_id: &str) -> EditResult<String> {
        let request = self
            .client
            .get(self.drive_url(&format!("files/{document_id}/export")))
            .query(&[("mimeType", "text/html")]);
        self.send(request)
    }

    fn list_documents(&self, parent: &str) -> EditResult<Vec<DocumentSummary>> {
        let files = self.list_files(
            &documents_query(parent),
            "nextPageToken,files(id,name,modifiedTime)",
        )?;
        Ok(files
            .into_iter()
            .map(|file| DocumentSummary {
                url: document_url(&file.id),
                id: file.id,
                name: file.name,
                modified_time: file.modified_time.unwrap_or_default(),
            })
            .collect())
    }

    fn list_comments(&self, document_id: &str) -> EditResult<Vec<Comment>> {
        let mut comments = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(self.drive_url(&format!("files/{document_id}/comments")))
                .query(&[("includeDeleted", "false"), ("fields", COMMENT_FIELDS)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: CommentList = self.send_json(request)?;
            comments.extend(page.comments.into_iter().map(Comment::from));
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(comments)
    }

    fn create_reply(&self, document_id: &str, comment_id: &str, content: &str) -> EditResult<()> {
        let request = self
            .client
            .post(self.drive_url(&format!(
                "files/{document_id}/comments/{comment_id}/replies"
            )))
            .query(&[("fields", "id")])
            .json(&json!({ "content": content }));
        self.send(request)?;
        Ok(())
    }

    fn resolve_comment(&self, document_id: &str, comment_id: &str) -> EditResult<()> {
        let request = self
            .client
            .patch(self.drive_url(&format!("files/{document_id}/comments/{comment_id}")))
            .query(&[("fields", "id")])
            .json(&json!({ "resolved": true }));
        self.send(request)?;
        Ok(())
    }
}

/// Quote a value for a Drive `q` expression.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn folder_query(parent: &str, name: &str) -> String {
    format!(
        "name = '{}' and '{}' in parents and mimeType = '{FOLDER_MIME}' and trashed = false",
        escape_query_value(name),
        escape_query_value(parent)
    )
}

fn documents_query(parent: &str) -> String {
    format!(
        "'{}' in parents and mimeType = '{DOCUMENT_MIME}' and trashed = false",
        escape_query_value(parent)
    )
}

fn remote_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.trim().to_string())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    #[serde(default)]
    name: String,
    modified_time: Option<String>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: String,
}

#[derive(Deserialize, Default)]
struct DocumentResource {
    #[serde(default)]
    body: DocumentBody,
}

#[derive(Deserialize, Default)]
struct DocumentBody {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    end_index: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentList {
    #[serde(default)]
    comments: Vec<RemoteComment>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteComment {
    id: String,
    author: Option<Author>,
    content: Option<String>,
    #[serde(default)]
    resolved: bool,
    created_time: Option<String>,
    quoted_file_content: Option<QuotedContent>,
    #[serde(default)]
    replies: Vec<RemoteReply>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteReply {
    id: String,
    author: Option<Author>,
    content: Option<String>,
    created_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Author {
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct QuotedContent {
    value: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

impl From<RemoteComment> for Comment {
    fn from(remote: RemoteComment) -> Self {
        Comment {
            id: remote.id,
            author: remote.author.and_then(|author| author.display_name),
            content: remote.content,
            resolved: remote.resolved,
            created_time: remote.created_time,
            quoted_text: remote.quoted_file_content.and_then(|quoted| quoted.value),
            replies: remote.replies.into_iter().map(Reply::from).collect(),
        }
    }
}

impl From<RemoteReply> for Reply {
    fn from(remote: RemoteReply) -> Self {
        Reply {
            id: remote.id,
            author: remote.author.and_then(|author| author.display_name),
            content: remote.content,
            created_time: remote.created_time,
        }
    }
}
