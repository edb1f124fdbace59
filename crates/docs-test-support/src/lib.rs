//! Shared test harness utilities for the docs-mcp crates.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use docs_config::{Config, LoadOptions};
use docs_edit_core::{
    BatchPlan, BatchRequest, Comment, DocumentStore, DocumentSummary, EditError, EditResult,
    ServiceSettings,
};
use docs_markdown::EditOperation;

pub const ROOT_FOLDER: &str = "root-folder";

/// Service settings pointing at [`ROOT_FOLDER`].
pub fn test_settings() -> ServiceSettings {
    ServiceSettings {
        root_folder_id: Some(ROOT_FOLDER.to_string()),
        ..ServiceSettings::default()
    }
}

/// Configuration built from defaults and the given variables only.
pub fn config_with_env(vars: &[(&str, &str)]) -> Config {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    let working_dir = std::env::temp_dir();
    Config::load(
        LoadOptions::default()
            .with_working_dir(working_dir)
            .with_env(env),
    )
    .unwrap_or_else(|err| panic!("failed to load test config: {err}"))
}

#[derive(Debug, Clone)]
pub struct MemoryFolder {
    pub id: String,
    pub parent: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct MemoryDocument {
    pub id: String,
    pub parent: String,
    pub title: String,
    pub modified_time: String,
    /// Body text without the final newline every document keeps.
    pub body: String,
    /// Export returned instead of rendering `body`.
    pub html: Option<String>,
    pub batches: Vec<Vec<BatchRequest>>,
    pub comments: Vec<Comment>,
}

impl MemoryDocument {
    /// End index of the body as the Docs API reports it.
    pub fn end_index(&self) -> usize {
        utf16_len(&self.body) + 2
    }
}

/// In-memory [`DocumentStore`] that records every call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    folders: RefCell<Vec<MemoryFolder>>,
    documents: RefCell<Vec<MemoryDocument>>,
    calls: RefCell<Vec<String>>,
    clock: Cell<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        let tick = self.clock.get() + 1;
        self.clock.set(tick);
        format!("{prefix}-{tick}")
    }

    fn timestamp(&self) -> String {
        format!("2026-01-01T00:00:{:02}.000Z", self.clock.get())
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    /// Seed a document whose export is `html`.
    pub fn add_document(&self, parent: &str, title: &str, body: &str, html: Option<&str>) -> String {
        let id = self.next_id("doc");
        self.documents.borrow_mut().push(MemoryDocument {
            id: id.clone(),
            parent: parent.to_string(),
            title: title.to_string(),
            modified_time: self.timestamp(),
            body: body.to_string(),
            html: html.map(str::to_string),
            batches: Vec::new(),
            comments: Vec::new(),
        });
        id
    }

    pub fn add_folder(&self, parent: &str, name: &str) -> String {
        let id = self.next_id("folder");
        self.folders.borrow_mut().push(MemoryFolder {
            id: id.clone(),
            parent: parent.to_string(),
            name: name.to_string(),
        });
        id
    }

    pub fn add_comment(&self, document_id: &str, comment: Comment) {
        if let Some(doc) = self
            .documents
            .borrow_mut()
            .iter_mut()
            .find(|doc| doc.id == document_id)
        {
            doc.comments.push(comment);
        }
    }

    pub fn document(&self, id: &str) -> Option<MemoryDocument> {
        self.documents.borrow().iter().find(|doc| doc.id == id).cloned()
    }

    pub fn folders(&self) -> Vec<MemoryFolder> {
        self.folders.borrow().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn with_document<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut MemoryDocument) -> EditResult<T>,
    ) -> EditResult<T> {
        let mut documents = self.documents.borrow_mut();
        let doc = documents
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or_else(|| EditError::NotFound(format!("document {id}")))?;
        f(doc)
    }
}

impl DocumentStore for MemoryStore {
    fn find_folder(&self, parent: &str, name: &str) -> EditResult<Option<String>> {
        self.record(format!("find_folder {parent} {name}"));
        Ok(self
            .folders
            .borrow()
            .iter()
            .find(|folder| folder.parent == parent && folder.name == name)
            .map(|folder| folder.id.clone()))
    }

    fn create_folder(&self, parent: &str, name: &str) -> EditResult<String> {
        self.record(format!("create_folder {parent} {name}"));
        Ok(self.add_folder(parent, name))
    }

    fn create_document(&self, parent: &str, title: &str) -> EditResult<String> {
        self.record(format!("create_document {parent} {title}"));
        Ok(self.add_document(parent, title, "", None))
    }

    fn body_end_index(&self, document_id: &str) -> EditResult<Option<usize>> {
        self.record(format!("body_end_index {document_id}"));
        self.with_document(document_id, |doc| Ok(Some(doc.end_index())))
    }

    fn batch_update(&self, document_id: &str, plan: &BatchPlan) -> EditResult<()> {
        self.record(format!("batch_update {document_id} {}", plan.len()));
        let timestamp = self.timestamp();
        self.with_document(document_id, |doc| {
            for request in plan.requests() {
                apply_request(&mut doc.body, request)?;
            }
            doc.batches.push(plan.requests().to_vec());
            doc.html = None;
            doc.modified_time = timestamp;
            Ok(())
        })
    }

    fn export_html(&self, document_id: &str) -> EditResult<String> {
        self.record(format!("export_html {document_id}"));
        self.with_document(document_id, |doc| {
            Ok(doc.html.clone().unwrap_or_else(|| render_paragraphs(&doc.body)))
        })
    }

    fn list_documents(&self, parent: &str) -> EditResult<Vec<DocumentSummary>> {
        self.record(format!("list_documents {parent}"));
        let mut docs: Vec<DocumentSummary> = self
            .documents
            .borrow()
            .iter()
            .filter(|doc| doc.parent == parent)
            .map(|doc| DocumentSummary {
                id: doc.id.clone(),
                name: doc.title.clone(),
                url: docs_edit_core::document_url(&doc.id),
                modified_time: doc.modified_time.clone(),
            })
            .collect();
        docs.sort_by(|a, b| b.modified_time.cmp(&a.modified_time));
        Ok(docs)
    }

    fn list_comments(&self, document_id: &str) -> EditResult<Vec<Comment>> {
        self.record(format!("list_comments {document_id}"));
        self.with_document(document_id, |doc| Ok(doc.comments.clone()))
    }

    fn create_reply(&self, document_id: &str, comment_id: &str, content: &str) -> EditResult<()> {
        self.record(format!("create_reply {document_id} {comment_id}"));
        let reply_id = self.next_id("reply");
        self.with_document(document_id, |doc| {
            let comment = find_comment(doc, comment_id)?;
            comment.replies.push(docs_edit_core::Reply {
                id: reply_id,
                author: Some("docs-mcp".to_string()),
                content: Some(content.to_string()),
                created_time: None,
            });
            Ok(())
        })
    }

    fn resolve_comment(&self, document_id: &str, comment_id: &str) -> EditResult<()> {
        self.record(format!("resolve_comment {document_id} {comment_id}"));
        self.with_document(document_id, |doc| {
            find_comment(doc, comment_id)?.resolved = true;
            Ok(())
        })
    }
}

fn find_comment<'a>(doc: &'a mut MemoryDocument, comment_id: &str) -> EditResult<&'a mut Comment> {
    doc.comments
        .iter_mut()
        .find(|comment| comment.id == comment_id)
        .ok_or_else(|| EditError::NotFound(format!("comment {comment_id}")))
}

/// Apply one request to `body`, indexing in UTF-16 units from offset 1.
fn apply_request(body: &mut String, request: &BatchRequest) -> EditResult<()> {
    match request {
        BatchRequest::DeleteContentRange { range } => {
            let start = byte_offset(body, range.start)?;
            let end = byte_offset(body, range.end)?;
            body.replace_range(start..end, "");
        }
        BatchRequest::Edit(EditOperation::InsertText { at_offset, text }) => {
            let at = byte_offset(body, *at_offset)?;
            body.insert_str(at, text);
        }
        BatchRequest::Edit(operation) => {
            let limit = utf16_len(body) + 2;
            if let Some(range) = operation.range() {
                if range.end > limit {
                    return Err(EditError::Remote {
                        status: 400,
                        message: format!("range {range} exceeds body end {limit}"),
                    });
                }
            }
        }
    }
    Ok(())
}

fn byte_offset(body: &str, offset: usize) -> EditResult<usize> {
    let target = offset.checked_sub(1).ok_or_else(|| EditError::Remote {
        status: 400,
        message: "offset 0 is outside the body".to_string(),
    })?;

    let mut units = 0usize;
    for (idx, ch) in body.char_indices() {
        if units == target {
            return Ok(idx);
        }
        units += ch.len_utf16();
    }
    if units == target {
        return Ok(body.len());
    }

    Err(EditError::Remote {
        status: 400,
        message: format!("offset {offset} is outside the body"),
    })
}

fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

fn render_paragraphs(body: &str) -> String {
    body.lines()
        .map(|line| format!("<p>{line}</p>"))
        .collect::<Vec<_>>()
        .join("")
}
