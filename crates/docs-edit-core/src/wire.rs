//! JSON shapes of the Docs API `documents.batchUpdate` call.

use docs_markdown::{BlockStyle, EditOperation, TextRange};
use serde::Serialize;

use crate::plan::{BatchPlan, BatchRequest};

const BULLET_PRESET: &str = "BULLET_DISC_CIRCLE_SQUARE";

#[derive(Debug, Serialize)]
pub struct BatchUpdateBody {
    pub requests: Vec<WireRequest>,
}

impl From<&BatchPlan> for BatchUpdateBody {
    fn from(plan: &BatchPlan) -> Self {
        Self {
            requests: plan.requests().iter().map(WireRequest::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WireRequest {
    InsertText {
        location: Location,
        text: String,
    },
    UpdateParagraphStyle {
        range: WireRange,
        paragraph_style: ParagraphStyle,
        fields: &'static str,
    },
    CreateParagraphBullets {
        range: WireRange,
        bullet_preset: &'static str,
    },
    UpdateTextStyle {
        range: WireRange,
        text_style: TextStyle,
        fields: String,
    },
    DeleteContentRange {
        range: WireRange,
    },
}

#[derive(Debug, Serialize)]
pub struct Location {
    pub index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRange {
    pub start_index: usize,
    pub end_index: usize,
}

impl From<TextRange> for WireRange {
    fn from(range: TextRange) -> Self {
        Self {
            start_index: range.start,
            end_index: range.end,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphStyle {
    pub named_style_type: &'static str,
}

/// Only flags that are set are sent; `fields` names exactly those.
#[derive(Debug, Serialize)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
}

pub fn named_style_type(style: BlockStyle) -> &'static str {
    match style {
        BlockStyle::Heading1 => "HEADING_1",
        BlockStyle::Heading2 => "HEADING_2",
        BlockStyle::Heading3 => "HEADING_3",
        BlockStyle::Body => "NORMAL_TEXT",
    }
}

impl From<&EditOperation> for WireRequest {
    fn from(operation: &EditOperation) -> Self {
        match operation {
            EditOperation::InsertText { at_offset, text } => WireRequest::InsertText {
                location: Location { index: *at_offset },
                text: text.clone(),
            },
            EditOperation::SetParagraphStyle { range, style } => {
                WireRequest::UpdateParagraphStyle {
                    range: (*range).into(),
                    paragraph_style: ParagraphStyle {
                        named_style_type: named_style_type(*style),
                    },
                    fields: "namedStyleType",
                }
            }
            EditOperation::SetBullet { range } => WireRequest::CreateParagraphBullets {
                range: (*range).into(),
                bullet_preset: BULLET_PRESET,
            },
            EditOperation::SetTextEmphasis {
                range,
                bold,
                italic_or_code,
            } => {
                let fields: Vec<&str> = [(*bold, "bold"), (*italic_or_code, "italic")]
                    .into_iter()
                    .filter_map(|(set, name)| set.then_some(name))
                    .collect();
                WireRequest::UpdateTextStyle {
                    range: (*range).into(),
                    text_style: TextStyle {
                        bold: bold.then_some(true),
                        italic: italic_or_code.then_some(true),
                    },
                    fields: fields.join(","),
                }
            }
        }
    }
}

impl From<&BatchRequest> for WireRequest {
    fn from(request: &BatchRequest) -> Self {
        match request {
            BatchRequest::DeleteContentRange { range } => WireRequest::DeleteContentRange {
                range: (*range).into(),
            },
            BatchRequest::Edit(operation) => operation.into(),
        }
    }
}
