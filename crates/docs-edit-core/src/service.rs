use tracing::{debug, info};

use crate::diff::build_unified_diff;
use crate::document::{document_url, parse_doc_id};
use crate::error::{EditError, EditResult};
use crate::export::html_to_markdown;
use crate::plan::BatchPlan;
use crate::store::{Comment, DocumentStore, DocumentSummary};

/// Google Docs rejects bodies much past a million characters.
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 1_000_000;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Folder every document and subfolder lives under.
    pub root_folder_id: Option<String>,
    pub max_content_chars: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            root_folder_id: None,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedDocument {
    pub id: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub document_id: String,
    /// Requests sent, or that a dry run would send.
    pub requests: usize,
    /// Present for dry runs whose content differs from the document.
    pub diff: Option<String>,
}

/// Document operations exposed to agents, built on a [`DocumentStore`].
pub struct DocsService<S> {
    store: S,
    settings: ServiceSettings,
}

impl<S: DocumentStore> DocsService<S> {
    pub fn new(store: S, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    fn root_folder(&self) -> EditResult<&str> {
        self.settings
            .root_folder_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| EditError::Configuration("DRIVE_FOLDER_ID is required".to_string()))
    }

    /// Folder to work in: the named subfolder of the root (created on first
    /// use) or the root itself.
    fn parent_folder(&self, subfolder: Option<&str>) -> EditResult<String> {
        let root = self.root_folder()?;
        let Some(name) = subfolder.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(root.to_string());
        };

        if let Some(id) = self.store.find_folder(root, name)? {
            return Ok(id);
        }

        let id = self.store.create_folder(root, name)?;
        info!("Created subfolder '{}' ({})", name, id);
        Ok(id)
    }

    pub fn create_doc(
        &self,
        title: &str,
        content: &str,
        subfolder: Option<&str>,
    ) -> EditResult<CreatedDocument> {
        if title.trim().is_empty() {
            return Err(EditError::InvalidArguments(
                "document title must not be empty".to_string(),
            ));
        }

        let plan = BatchPlan::for_new_document(content, self.settings.max_content_chars)?;
        let parent = self.parent_folder(subfolder)?;
        let id = self.store.create_document(&parent, title)?;
        info!("Created document '{}' ({})", title, id);

        if !plan.is_empty() {
            debug!("Filling document {} with {} requests", id, plan.len());
            self.store.batch_update(&id, &plan)?;
        }

        Ok(CreatedDocument {
            url: document_url(&id),
            id,
            title: title.to_string(),
        })
    }

    /// Replace the whole body of a document with `content`.
    ///
    /// A dry run writes nothing and reports a diff against the document as
    /// it currently reads back.
    pub fn update_doc(&self, doc: &str, content: &str, dry_run: bool) -> EditResult<UpdateOutcome> {
        let id = parse_doc_id(doc)?;
        let existing_end = self.store.body_end_index(&id)?;
        let plan = BatchPlan::for_replacement(content, existing_end, self.settings.max_content_chars)?;

        if dry_run {
            let current = html_to_markdown(&self.store.export_html(&id)?);
            return Ok(UpdateOutcome {
                diff: build_unified_diff(&current, content, &id),
                document_id: id,
                requests: plan.len(),
            });
        }

        if !plan.is_empty() {
            debug!(
                "Replacing body of {} (end index {:?}) with {} requests",
                id,
                existing_end,
                plan.len()
            );
            self.store.batch_update(&id, &plan)?;
        }

        Ok(UpdateOutcome {
            document_id: id,
            requests: plan.len(),
            diff: None,
        })
    }

    pub fn read_doc(&self, doc: &str) -> EditResult<String> {
        let id = parse_doc_id(doc)?;
        let html = self.store.export_html(&id)?;
        Ok(html_to_markdown(&html))
    }

    pub fn list_docs(&self, subfolder: Option<&str>) -> EditResult<Vec<DocumentSummary>> {
        let parent = self.parent_folder(subfolder)?;
        self.store.list_documents(&parent)
    }

    pub fn get_comments(&self, doc: &str) -> EditResult<Vec<Comment>> {
        let id = parse_doc_id(doc)?;
        self.store.list_comments(&id)
    }

    pub fn reply_to_comment(&self, doc: &str, comment_id: &str, content: &str) -> EditResult<()> {
        let id = parse_doc_id(doc)?;
        require_non_empty("comment_id", comment_id)?;
        require_non_empty("reply", content)?;
        self.store.create_reply(&id, comment_id, content)
    }

    pub fn resolve_comment(&self, doc: &str, comment_id: &str) -> EditResult<()> {
        let id = parse_doc_id(doc)?;
        require_non_empty("comment_id", comment_id)?;
        self.store.resolve_comment(&id, comment_id)
    }
}

fn require_non_empty(name: &str, value: &str) -> EditResult<()> {
    if value.trim().is_empty() {
        return Err(EditError::InvalidArguments(format!(
            "{name} must not be empty"
        )));
    }
    Ok(())
}
