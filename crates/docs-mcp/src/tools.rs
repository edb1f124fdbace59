//! Tool catalogue and dispatch for `tools/list` and `tools/call`.

use docs_edit_core::{
    Comment, CreatedDocument, DocsService, DocumentStore, DocumentSummary, EditResult,
    UpdateOutcome,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

const DOC_PARAM: &str = "Google Doc URL or document ID";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Problems with the call itself, reported as JSON-RPC errors rather than
/// tool results.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("{0}")]
    InvalidArguments(String),
}

/// Text returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    pub is_error: bool,
}

impl ToolOutput {
    fn from_result(result: EditResult<String>) -> Self {
        match result {
            Ok(text) => Self {
                text,
                is_error: false,
            },
            Err(err) => {
                warn!("Tool call failed: {}", err);
                Self {
                    text: err.to_string(),
                    is_error: true,
                }
            }
        }
    }

    pub fn into_result(self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error,
        })
    }
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "create_doc",
            description: "Create a new Google Doc from Markdown content in the configured \
Drive folder. Returns the doc URL.",
            input_schema: object_schema(
                &[
                    ("title", "Document title"),
                    ("content", "Document content in Markdown format"),
                ],
                &[(
                    "subfolder",
                    "Optional subfolder name (e.g. 'PRDs', 'Specs'). Created if it doesn't exist.",
                )],
            ),
        },
        ToolDefinition {
            name: "update_doc",
            description: "Replace the full content of a Google Doc with new Markdown content.",
            input_schema: {
                let mut schema = object_schema(
                    &[
                        ("doc", DOC_PARAM),
                        ("content", "New document content in Markdown format"),
                    ],
                    &[],
                );
                schema["properties"]["dry_run"] = json!({
                    "type": "boolean",
                    "description": "Show a diff against the current document without writing",
                });
                schema
            },
        },
        ToolDefinition {
            name: "read_doc",
            description: "Read the content of a Google Doc as Markdown.",
            input_schema: object_schema(&[("doc", DOC_PARAM)], &[]),
        },
        ToolDefinition {
            name: "list_docs",
            description: "List Google Docs in the configured Drive folder, optionally \
filtered to a subfolder.",
            input_schema: object_schema(
                &[],
                &[("subfolder", "Optional subfolder name to list docs from")],
            ),
        },
        ToolDefinition {
            name: "get_comments",
            description: "Get all comments (and their replies) on a Google Doc.",
            input_schema: object_schema(&[("doc", DOC_PARAM)], &[]),
        },
        ToolDefinition {
            name: "reply_to_comment",
            description: "Post a reply to a comment on a Google Doc.",
            input_schema: object_schema(
                &[
                    ("doc", DOC_PARAM),
                    ("comment_id", "The ID of the comment to reply to"),
                    ("reply", "The reply text"),
                ],
                &[],
            ),
        },
        ToolDefinition {
            name: "resolve_comment",
            description: "Mark a comment as resolved on a Google Doc.",
            input_schema: object_schema(
                &[
                    ("doc", DOC_PARAM),
                    ("comment_id", "The ID of the comment to resolve"),
                ],
                &[],
            ),
        },
    ]
}

fn object_schema(required: &[(&str, &str)], optional: &[(&str, &str)]) -> Value {
    let mut properties = Map::new();
    for (name, description) in required.iter().chain(optional) {
        properties.insert(
            name.to_string(),
            json!({ "type": "string", "description": description }),
        );
    }
    let required: Vec<&str> = required.iter().map(|(name, _)| *name).collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Run the named tool. Service failures become error outputs; only an
/// unknown tool or malformed arguments fail the call.
pub fn call<S: DocumentStore>(
    service: &DocsService<S>,
    name: &str,
    arguments: &Value,
) -> Result<ToolOutput, ToolCallError> {
    let args = Arguments::new(arguments)?;
    debug!("Calling tool {}", name);

    let result = match name {
        "create_doc" => {
            let title = args.required("title")?;
            let content = args.required("content")?;
            let subfolder = args.optional("subfolder")?;
            service
                .create_doc(title, content, subfolder)
                .map(|created| render_created(&created))
        }
        "update_doc" => {
            let doc = args.required("doc")?;
            let content = args.required("content")?;
            let dry_run = args.flag("dry_run")?;
            service
                .update_doc(doc, content, dry_run)
                .map(|outcome| render_update(&outcome, dry_run))
        }
        "read_doc" => service.read_doc(args.required("doc")?),
        "list_docs" => service
            .list_docs(args.optional("subfolder")?)
            .map(|docs| render_doc_list(&docs)),
        "get_comments" => service
            .get_comments(args.required("doc")?)
            .and_then(|comments| render_comments(&comments)),
        "reply_to_comment" => {
            let doc = args.required("doc")?;
            let comment_id = args.required("comment_id")?;
            let reply = args.required("reply")?;
            service
                .reply_to_comment(doc, comment_id, reply)
                .map(|()| "Reply posted.".to_string())
        }
        "resolve_comment" => {
            let doc = args.required("doc")?;
            let comment_id = args.required("comment_id")?;
            service
                .resolve_comment(doc, comment_id)
                .map(|()| "Comment resolved.".to_string())
        }
        other => return Err(ToolCallError::UnknownTool(other.to_string())),
    };

    Ok(ToolOutput::from_result(result))
}

struct Arguments<'a> {
    values: Option<&'a Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    fn new(arguments: &'a Value) -> Result<Self, ToolCallError> {
        match arguments {
            Value::Null => Ok(Self { values: None }),
            Value::Object(values) => Ok(Self {
                values: Some(values),
            }),
            _ => Err(ToolCallError::InvalidArguments(
                "tool arguments must be an object".to_string(),
            )),
        }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.values
            .and_then(|values| values.get(name))
            .filter(|value| !value.is_null())
    }

    fn required(&self, name: &str) -> Result<&'a str, ToolCallError> {
        self.optional(name)?.ok_or_else(|| {
            ToolCallError::InvalidArguments(format!("missing required argument '{name}'"))
        })
    }

    fn optional(&self, name: &str) -> Result<Option<&'a str>, ToolCallError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(ToolCallError::InvalidArguments(format!(
                "argument '{name}' must be a string"
            ))),
        }
    }

    fn flag(&self, name: &str) -> Result<bool, ToolCallError> {
        match self.get(name) {
            None => Ok(false),
            Some(Value::Bool(value)) => Ok(*value),
            Some(_) => Err(ToolCallError::InvalidArguments(format!(
                "argument '{name}' must be a boolean"
            ))),
        }
    }
}

fn render_created(created: &CreatedDocument) -> String {
    format!(
        "Created: **{}**\nURL: {}\nID: {}",
        created.title, created.url, created.id
    )
}

fn render_update(outcome: &UpdateOutcome, dry_run: bool) -> String {
    if !dry_run {
        return "Doc updated.".to_string();
    }
    match &outcome.diff {
        Some(diff) => format!(
            "{}\n\nWould send {} requests.",
            diff.trim_end(),
            outcome.requests
        ),
        None => "No changes.".to_string(),
    }
}

fn render_doc_list(docs: &[DocumentSummary]) -> String {
    if docs.is_empty() {
        return "No docs found.".to_string();
    }
    docs.iter()
        .map(|doc| {
            format!(
                "- **{}**\n  {}\n  Modified: {}",
                doc.name, doc.url, doc.modified_time
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_comments(comments: &[Comment]) -> EditResult<String> {
    if comments.is_empty() {
        return Ok("No comments found.".to_string());
    }
    Ok(serde_json::to_string_pretty(comments)?)
}
