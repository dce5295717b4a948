//! Tool declarations and argument validation
//!
//! The model only ever sees the declared schemas below; anything it sends
//! back is validated against them before a tool runs. Only the declared
//! fields are trusted, never the model's free text.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const SAVE_NOTE: &str = "save_note";
pub const FIND_NOTE: &str = "find_note";

/// Definition of a tool the model can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Gemini-style parameter schema.
    pub parameters: Value,
}

/// The two tools this assistant declares on every call.
pub fn declarations() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: SAVE_NOTE.to_string(),
            description: "Save a study resource link provided by a student.".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "subject": { "type": "STRING", "description": "Subject name" },
                    "link": { "type": "STRING", "description": "URL link" },
                    "semester": { "type": "STRING", "description": "Semester (1-8)" }
                },
                "required": ["subject", "link"]
            }),
        },
        ToolDefinition {
            name: FIND_NOTE.to_string(),
            description: "Find verified study notes for a specific subject.".to_string(),
            parameters: json!({
                "type": "OBJECT",
                "properties": {
                    "subject": { "type": "STRING", "description": "Subject name" },
                    "semester": { "type": "STRING", "description": "Optional semester number (1-8)" }
                },
                "required": ["subject"]
            }),
        },
    ]
}

/// A tool-call proposal missing or malforming a declared field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolArgumentError {
    #[error("tool '{tool}': missing required argument '{field}'")]
    MissingField {
        tool: &'static str,
        field: &'static str,
    },
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

fn required_str(
    args: &Value,
    tool: &'static str,
    field: &'static str,
) -> Result<String, ToolArgumentError> {
    args.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ToolArgumentError::MissingField { tool, field })
}

fn optional_str(args: &Value, field: &str) -> Option<String> {
    args.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validated arguments for `save_note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveNoteArgs {
    pub subject: String,
    pub link: String,
    pub semester: Option<String>,
}

impl SaveNoteArgs {
    pub fn parse(args: &Value) -> Result<Self, ToolArgumentError> {
        Ok(Self {
            subject: required_str(args, SAVE_NOTE, "subject")?,
            link: required_str(args, SAVE_NOTE, "link")?,
            semester: optional_str(args, "semester"),
        })
    }
}

/// Validated arguments for `find_note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindNoteArgs {
    pub subject: String,
    pub semester: Option<String>,
}

impl FindNoteArgs {
    pub fn parse(args: &Value) -> Result<Self, ToolArgumentError> {
        Ok(Self {
            subject: required_str(args, FIND_NOTE, "subject")?,
            semester: optional_str(args, "semester"),
        })
    }
}
