use docs_markdown::{compile, text_len, EditOperation, TextRange, BODY_START};

use crate::error::{EditError, EditResult};

/// End index the remote service reports for a body holding only its final
/// newline.
pub const EMPTY_BODY_END: usize = 2;

/// Request inside one atomic batch update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRequest {
    DeleteContentRange { range: TextRange },
    Edit(EditOperation),
}

impl From<EditOperation> for BatchRequest {
    fn from(operation: EditOperation) -> Self {
        BatchRequest::Edit(operation)
    }
}

/// Ordered requests ready to be sent as one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    requests: Vec<BatchRequest>,
}

impl BatchPlan {
    /// Requests that fill a freshly created, empty document.
    pub fn for_new_document(markdown: &str, max_content_chars: usize) -> EditResult<Self> {
        ensure_within_limit(markdown, max_content_chars)?;
        Ok(Self {
            requests: compile(markdown).into_iter().map(Into::into).collect(),
        })
    }

    /// Requests that replace the whole body of an existing document.
    ///
    /// `existing_end` is the end index of the body's last element; `None`
    /// means the body reported no content.
    pub fn for_replacement(
        markdown: &str,
        existing_end: Option<usize>,
        max_content_chars: usize,
    ) -> EditResult<Self> {
        ensure_within_limit(markdown, max_content_chars)?;

        let end = existing_end.unwrap_or(EMPTY_BODY_END);
        let mut requests = Vec::new();
        if end > EMPTY_BODY_END {
            // The final newline of a body can never be deleted.
            requests.push(BatchRequest::DeleteContentRange {
                range: TextRange::new(BODY_START, end - 1),
            });
        }
        requests.extend(compile(markdown).into_iter().map(BatchRequest::from));

        Ok(Self { requests })
    }

    pub fn requests(&self) -> &[BatchRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

pub fn ensure_within_limit(markdown: &str, max_content_chars: usize) -> EditResult<()> {
    let actual = text_len(markdown);
    if actual > max_content_chars {
        return Err(EditError::ContentTooLarge {
            limit: max_content_chars,
            actual,
        });
    }
    Ok(())
}
