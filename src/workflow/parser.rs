//! Workflow definition parser.
//!
//! Definitions are authored as YAML (the format the authoring tools emit)
//! or arrive as raw JSON from the API layer.

use std::path::Path;

use serde_json::Value;

use super::types::WorkflowDefinition;
use crate::error::{Error, Result};

/// Parse a workflow definition from a YAML string.
pub fn parse_workflow(yaml: &str) -> Result<WorkflowDefinition> {
    if yaml.trim().is_empty() {
        return Err(Error::Parse("Empty workflow definition".to_string()));
    }

    let workflow: WorkflowDefinition = serde_yaml::from_str(yaml).map_err(|e| {
        let msg = e.to_string();
        if let Some(field) = extract_missing_field(&msg) {
            Error::Parse(format!("Missing required field: {}", field))
        } else {
            Error::Parse(format!("Invalid YAML: {}", msg))
        }
    })?;
    Ok(workflow)
}

/// Parse a workflow definition from a file path.
pub fn parse_workflow_file(path: &Path) -> Result<WorkflowDefinition> {
    let content = std::fs::read_to_string(path)?;
    parse_workflow(&content)
}

/// Build a typed workflow definition from a raw JSON value.
///
/// The API layer validates candidates with
/// [`validate_workflow`](super::validate_workflow) before calling this;
/// type errors here therefore indicate a caller bug, not bad user input.
pub fn workflow_from_value(value: Value) -> Result<WorkflowDefinition> {
    serde_json::from_value(value).map_err(|e| {
        let msg = e.to_string();
        if let Some(field) = extract_missing_field(&msg) {
            Error::Parse(format!("Missing required field: {}", field))
        } else {
            Error::Parse(format!("Invalid workflow JSON: {}", msg))
        }
    })
}

fn extract_missing_field(error_message: &str) -> Option<&str> {
    let marker = "missing field `";
    let start = error_message.find(marker)? + marker.len();
    let rest = &error_message[start..];
    let end = rest.find('`')?;
    Some(&rest[..end])
}
