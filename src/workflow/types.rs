//! Workflow type definitions.
//!
//! Field names follow the product's JSON wire format (camelCase), since
//! definitions are produced by the external API layer and stored verbatim
//! by the persistence layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete workflow definition.
///
/// The engine borrows an immutable snapshot of this for the duration of one
/// execution and never mutates it. Versioning and the audit trail belong to
/// the persistence layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    /// Unique workflow identifier
    pub id: String,

    /// Owning tenant
    pub tenant_id: String,

    /// Owning client workspace within the tenant
    pub client_id: String,

    /// Human-readable name
    pub name: String,

    /// Monotonically increasing version number
    #[serde(default = "default_version")]
    pub version: u32,

    /// Lifecycle status
    #[serde(default)]
    pub status: WorkflowStatus,

    /// Trigger identifiers that start this workflow
    pub triggers: Vec<String>,

    /// Nodes (steps) in execution order
    pub nodes: Vec<WorkflowNode>,

    /// Action identifiers this workflow is allowed to perform.
    /// Must be a superset of the actions referenced by action nodes.
    pub actions: Vec<String>,

    /// Condition labels referenced by this workflow
    pub conditions: Vec<String>,

    /// Authoring metadata
    pub metadata: WorkflowMetadata,
}

fn default_version() -> u32 {
    1
}

/// Workflow lifecycle status.
///
/// Transitions are monotonic: `draft -> approved -> archived`, no going
/// back. The approval workflow that performs transitions lives outside this
/// crate; [`WorkflowStatus::can_transition_to`] only answers legality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Approved,
    Archived,
}

impl WorkflowStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: WorkflowStatus) -> bool {
        matches!(
            (self, next),
            (WorkflowStatus::Draft, WorkflowStatus::Approved)
                | (WorkflowStatus::Approved, WorkflowStatus::Archived)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Archived => "archived",
        }
    }
}

/// Authoring metadata attached to a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowMetadata {
    /// Who created this workflow (user id or "ai-assistant")
    pub created_by: String,

    /// When the workflow was created
    pub created_at: chrono::DateTime<chrono::Utc>,

    /// Free-text intent the workflow was generated from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

/// A node (step) in the workflow.
///
/// `id` is the stable reference used for event correlation in the external
/// execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Unique node ID within this workflow
    pub id: String,

    /// Typed node configuration
    #[serde(flatten)]
    pub config: NodeConfig,
}

/// Node configuration, tagged by node type.
///
/// Wire shape: `{"id": "...", "type": "condition", "config": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum NodeConfig {
    /// Advisory marker for the event that starts the workflow. The engine
    /// trusts the caller to route events and does not re-check `event`
    /// against the incoming trigger type.
    Trigger { event: String },

    /// Gate on a value resolved from the trigger payload.
    #[serde(rename_all = "camelCase")]
    Condition {
        operator: ConditionOperator,

        /// Dot-path into the trigger payload (array indices allowed)
        path: String,

        /// When true, a failing condition ends the run successfully
        stop_on_false: bool,

        /// Regex pattern, required by the `matches` operator
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },

    /// Perform one allow-listed channel action.
    Action {
        /// Action identifier consulted against the allow-list
        action: String,

        /// Handler-specific parameters
        #[serde(default)]
        params: Value,
    },

    /// Modeled delay. The engine records it; the external scheduler owns
    /// real-time suspension.
    Delay { hours: f64 },
}

impl NodeConfig {
    /// The wire name of this node type.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeConfig::Trigger { .. } => "trigger",
            NodeConfig::Condition { .. } => "condition",
            NodeConfig::Action { .. } => "action",
            NodeConfig::Delay { .. } => "delay",
        }
    }
}

/// Operators available to condition nodes.
///
/// `is_true` is the operator the product guarantees; the rest cover the
/// common payload shapes without needing a comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Resolved value is strictly boolean `true`
    IsTrue,
    /// Resolved value is strictly boolean `false`
    IsFalse,
    /// Path resolves to a non-null value
    Exists,
    /// Resolved string/array/object is non-empty
    NotEmpty,
    /// Stringified resolved value matches the condition's `pattern` regex
    Matches,
}

impl ConditionOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionOperator::IsTrue => "is_true",
            ConditionOperator::IsFalse => "is_false",
            ConditionOperator::Exists => "exists",
            ConditionOperator::NotEmpty => "not_empty",
            ConditionOperator::Matches => "matches",
        }
    }
}

impl WorkflowDefinition {
    /// Get a node by ID.
    pub fn get_node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Action identifiers referenced by action nodes, in node order.
    pub fn referenced_actions(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter_map(|n| match &n.config {
                NodeConfig::Action { action, .. } => Some(action.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of action nodes in this workflow.
    pub fn action_node_count(&self) -> usize {
        self.referenced_actions().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_wire_format_roundtrip() {
        let raw = json!({
            "id": "gate",
            "type": "condition",
            "config": {
                "operator": "is_true",
                "path": "noReply",
                "stopOnFalse": true
            }
        });

        let node: WorkflowNode = serde_json::from_value(raw.clone()).unwrap();
        match &node.config {
            NodeConfig::Condition {
                operator,
                path,
                stop_on_false,
                pattern,
            } => {
                assert_eq!(*operator, ConditionOperator::IsTrue);
                assert_eq!(path, "noReply");
                assert!(stop_on_false);
                assert!(pattern.is_none());
            }
            other => panic!("expected condition, got {}", other.type_name()),
        }

        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn test_action_node_params() {
        let raw = json!({
            "id": "nudge",
            "type": "action",
            "config": {
                "action": "email.send",
                "params": { "to": "a@b.co", "template": "gentle-nudge" }
            }
        });

        let node: WorkflowNode = serde_json::from_value(raw).unwrap();
        match &node.config {
            NodeConfig::Action { action, params } => {
                assert_eq!(action, "email.send");
                assert_eq!(params["template"], "gentle-nudge");
            }
            other => panic!("expected action, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_status_transitions_are_monotonic() {
        use WorkflowStatus::*;

        assert!(Draft.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Archived));

        assert!(!Approved.can_transition_to(Draft));
        assert!(!Archived.can_transition_to(Approved));
        assert!(!Archived.can_transition_to(Draft));
        assert!(!Draft.can_transition_to(Archived));
        assert!(!Draft.can_transition_to(Draft));
    }

    #[test]
    fn test_referenced_actions() {
        let raw = json!({
            "id": "wf-1",
            "tenantId": "tn-1",
            "clientId": "cl-1",
            "name": "two-touch",
            "version": 1,
            "status": "approved",
            "triggers": ["lead.inactive"],
            "actions": ["email.send", "sms.send"],
            "conditions": [],
            "metadata": { "createdBy": "u-1", "createdAt": "2025-11-02T09:30:00Z" },
            "nodes": [
                { "id": "t", "type": "trigger", "config": { "event": "lead.inactive" } },
                { "id": "a1", "type": "action", "config": { "action": "email.send" } },
                { "id": "d", "type": "delay", "config": { "hours": 24 } },
                { "id": "a2", "type": "action", "config": { "action": "sms.send" } }
            ]
        });

        let workflow: WorkflowDefinition = serde_json::from_value(raw).unwrap();
        assert_eq!(workflow.referenced_actions(), vec!["email.send", "sms.send"]);
        assert_eq!(workflow.action_node_count(), 2);
        assert!(workflow.get_node("d").is_some());
        assert!(workflow.get_node("missing").is_none());
    }
}
