//! Workflow validation.
//!
//! Candidates are validated as raw JSON before they may be stored or run,
//! so a single bad field cannot hide the rest of the problems: validation
//! never stops at the first violation and never fails itself.

use std::collections::HashSet;

use serde_json::Value;

use super::types::WorkflowDefinition;

/// Minimum length for a workflow name.
const MIN_NAME_LEN: usize = 3;

const ALLOWED_STATUSES: [&str; 3] = ["draft", "approved", "archived"];
const ALLOWED_NODE_TYPES: [&str; 4] = ["trigger", "condition", "action", "delay"];
const ALLOWED_OPERATORS: [&str; 5] = ["is_true", "is_false", "exists", "not_empty", "matches"];

/// Outcome of validating a workflow candidate.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ValidationReport {
    /// One entry per violation, naming location and reason
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Whether the candidate passed every rule.
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}

/// Validate a workflow candidate.
///
/// Checks, in order:
/// - required top-level fields present and correctly typed
/// - `name` length, `version` positivity, `status` value
/// - `triggers` and `nodes` non-empty
/// - per-node: unique non-empty `id`, allowed `type`, object `config`,
///   and the config keys that type requires
/// - `actions` non-empty and a superset of the actions referenced by nodes
/// - `metadata.createdBy` / `metadata.createdAt` (RFC 3339)
pub fn validate_workflow(candidate: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(obj) = candidate.as_object() else {
        report.push("workflow definition must be a JSON object");
        return report;
    };

    for field in ["id", "tenantId", "clientId"] {
        check_non_empty_string(obj.get(field), field, &mut report);
    }

    match obj.get("name") {
        Some(Value::String(name)) if name.chars().count() >= MIN_NAME_LEN => {}
        Some(Value::String(_)) => {
            report.push(format!("name must be at least {} characters", MIN_NAME_LEN))
        }
        Some(_) => report.push("name must be a string"),
        None => report.push("name is required"),
    }

    match obj.get("version") {
        Some(v) => match v.as_u64() {
            Some(n) if n > 0 => {}
            _ => report.push("version must be a positive integer"),
        },
        None => report.push("version is required"),
    }

    match obj.get("status") {
        Some(Value::String(status)) if ALLOWED_STATUSES.contains(&status.as_str()) => {}
        Some(_) => report.push(format!(
            "status must be one of {}",
            ALLOWED_STATUSES.join(", ")
        )),
        None => report.push("status is required"),
    }

    check_string_array(obj.get("triggers"), "triggers", false, &mut report);

    let declared_actions = collect_string_array(obj.get("actions"));
    check_string_array(obj.get("actions"), "actions", false, &mut report);
    check_string_array(obj.get("conditions"), "conditions", true, &mut report);

    match obj.get("nodes") {
        Some(Value::Array(nodes)) if !nodes.is_empty() => {
            let mut seen_ids = HashSet::new();
            for (index, node) in nodes.iter().enumerate() {
                validate_node(node, index, &mut seen_ids, &declared_actions, &mut report);
            }
        }
        Some(Value::Array(_)) => report.push("nodes must not be empty"),
        Some(_) => report.push("nodes must be an array"),
        None => report.push("nodes is required"),
    }

    validate_metadata(obj.get("metadata"), &mut report);

    report
}

/// Validate an already-typed definition by serialising it back through the
/// candidate rules.
pub fn validate_definition(workflow: &WorkflowDefinition) -> ValidationReport {
    match serde_json::to_value(workflow) {
        Ok(value) => validate_workflow(&value),
        Err(e) => ValidationReport {
            errors: vec![format!("workflow definition is not serialisable: {}", e)],
        },
    }
}

fn validate_node(
    node: &Value,
    index: usize,
    seen_ids: &mut HashSet<String>,
    declared_actions: &Option<Vec<String>>,
    report: &mut ValidationReport,
) {
    let at = |rest: &str| format!("nodes[{}]{}", index, rest);

    let Some(obj) = node.as_object() else {
        report.push(at(" must be an object"));
        return;
    };

    let node_id = match obj.get("id") {
        Some(Value::String(id)) if !id.is_empty() => {
            if !seen_ids.insert(id.clone()) {
                report.push(at(&format!(".id '{}' is duplicated", id)));
            }
            Some(id.as_str())
        }
        Some(Value::String(_)) => {
            report.push(at(".id must not be empty"));
            None
        }
        Some(_) => {
            report.push(at(".id must be a string"));
            None
        }
        None => {
            report.push(at(".id is required"));
            None
        }
    };

    let node_type = match obj.get("type") {
        Some(Value::String(t)) if ALLOWED_NODE_TYPES.contains(&t.as_str()) => Some(t.as_str()),
        Some(Value::String(t)) => {
            report.push(at(&format!(
                ".type '{}' must be one of {}",
                t,
                ALLOWED_NODE_TYPES.join(", ")
            )));
            None
        }
        Some(_) => {
            report.push(at(".type must be a string"));
            None
        }
        None => {
            report.push(at(".type is required"));
            None
        }
    };

    let config = match obj.get("config") {
        Some(Value::Object(config)) => config,
        Some(_) => {
            report.push(at(".config must be an object"));
            return;
        }
        None => {
            report.push(at(".config is required"));
            return;
        }
    };

    match node_type {
        Some("trigger") => {
            if !matches!(config.get("event"), Some(Value::String(s)) if !s.is_empty()) {
                report.push(at(".config.event must be a non-empty string"));
            }
        }
        Some("condition") => {
            let operator = match config.get("operator") {
                Some(Value::String(op)) if ALLOWED_OPERATORS.contains(&op.as_str()) => {
                    Some(op.as_str())
                }
                Some(Value::String(op)) => {
                    report.push(at(&format!(
                        ".config.operator '{}' must be one of {}",
                        op,
                        ALLOWED_OPERATORS.join(", ")
                    )));
                    None
                }
                _ => {
                    report.push(at(".config.operator must be a string"));
                    None
                }
            };
            if !matches!(config.get("path"), Some(Value::String(s)) if !s.is_empty()) {
                report.push(at(".config.path must be a non-empty string"));
            }
            if !matches!(config.get("stopOnFalse"), Some(Value::Bool(_))) {
                report.push(at(".config.stopOnFalse must be a boolean"));
            }
            if operator == Some("matches") {
                match config.get("pattern") {
                    Some(Value::String(pattern)) => {
                        if regex_lite::Regex::new(pattern).is_err() {
                            report.push(at(&format!(
                                ".config.pattern '{}' is not a valid regex",
                                pattern
                            )));
                        }
                    }
                    _ => report.push(at(
                        ".config.pattern is required when operator is 'matches'",
                    )),
                }
            }
        }
        Some("action") => match config.get("action") {
            Some(Value::String(action)) if !action.is_empty() => {
                if let Some(declared) = declared_actions {
                    if !declared.iter().any(|a| a == action) {
                        let id = node_id.unwrap_or("?");
                        report.push(format!(
                            "node '{}' references action '{}' not declared in actions",
                            id, action
                        ));
                    }
                }
            }
            _ => report.push(at(".config.action must be a non-empty string")),
        },
        Some("delay") => match config.get("hours").and_then(Value::as_f64) {
            Some(hours) if hours >= 0.0 => {}
            Some(_) => report.push(at(".config.hours must not be negative")),
            None => report.push(at(".config.hours must be a number")),
        },
        _ => {} // type already reported
    }
}

fn validate_metadata(metadata: Option<&Value>, report: &mut ValidationReport) {
    let Some(obj) = metadata.and_then(Value::as_object) else {
        report.push("metadata must be an object");
        return;
    };

    check_non_empty_string(obj.get("createdBy"), "metadata.createdBy", report);

    match obj.get("createdAt") {
        Some(Value::String(raw)) => {
            if chrono::DateTime::parse_from_rfc3339(raw).is_err() {
                report.push(format!(
                    "metadata.createdAt '{}' is not an ISO-8601 timestamp",
                    raw
                ));
            }
        }
        _ => report.push("metadata.createdAt must be an ISO-8601 string"),
    }
}

fn check_non_empty_string(value: Option<&Value>, field: &str, report: &mut ValidationReport) {
    match value {
        Some(Value::String(s)) if !s.is_empty() => {}
        Some(Value::String(_)) => report.push(format!("{} must not be empty", field)),
        Some(_) => report.push(format!("{} must be a string", field)),
        None => report.push(format!("{} is required", field)),
    }
}

fn check_string_array(
    value: Option<&Value>,
    field: &str,
    allow_empty: bool,
    report: &mut ValidationReport,
) {
    match value {
        Some(Value::Array(items)) => {
            if items.is_empty() && !allow_empty {
                report.push(format!("{} must not be empty", field));
            }
            for (index, item) in items.iter().enumerate() {
                if !matches!(item, Value::String(s) if !s.is_empty()) {
                    report.push(format!("{}[{}] must be a non-empty string", field, index));
                }
            }
        }
        Some(_) => report.push(format!("{} must be an array of strings", field)),
        None => report.push(format!("{} is required", field)),
    }
}

fn collect_string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}
