//! Execution lifecycle events and observers.
//!
//! The engine reports node lifecycle events to a caller-supplied observer as
//! each node is processed. The observer is awaited before the run continues
//! (durable event logging lives behind it), and an observer failure aborts
//! the run.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::workflow::WorkflowNode;

/// Kinds of node lifecycle events. Serialized under their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeEventKind {
    /// A trigger node was seen (advisory)
    #[serde(rename = "node.trigger.observed")]
    TriggerObserved,
    /// A condition evaluated to true
    #[serde(rename = "node.condition.passed")]
    ConditionPassed,
    /// A condition evaluated to false and the run continued
    #[serde(rename = "node.condition.failed")]
    ConditionFailed,
    /// A condition evaluated to false and ended the run (stopOnFalse)
    #[serde(rename = "node.condition.halted")]
    ConditionHalted,
    /// An action was dispatched successfully
    #[serde(rename = "node.action.executed")]
    ActionExecuted,
    /// A delay node was recorded (never slept)
    #[serde(rename = "node.delay.recorded")]
    DelayRecorded,
}

impl NodeEventKind {
    /// Wire name used in the external execution event log.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeEventKind::TriggerObserved => "node.trigger.observed",
            NodeEventKind::ConditionPassed => "node.condition.passed",
            NodeEventKind::ConditionFailed => "node.condition.failed",
            NodeEventKind::ConditionHalted => "node.condition.halted",
            NodeEventKind::ActionExecuted => "node.action.executed",
            NodeEventKind::DelayRecorded => "node.delay.recorded",
        }
    }
}

impl std::fmt::Display for NodeEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One lifecycle event, as forwarded by [`ChannelObserver`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEvent {
    pub execution_id: String,
    pub node_id: String,
    pub event_type: NodeEventKind,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Observer for node lifecycle events.
///
/// Implementations may perform I/O (e.g. appending to the durable event
/// log); returning an error aborts the run that emitted the event.
#[async_trait]
pub trait ExecutionObserver: Send + Sync {
    async fn on_node_event(&self, node: &WorkflowNode, kind: NodeEventKind) -> Result<()>;
}

/// Observer that discards all events.
pub struct NullObserver;

#[async_trait]
impl ExecutionObserver for NullObserver {
    async fn on_node_event(&self, _node: &WorkflowNode, _kind: NodeEventKind) -> Result<()> {
        Ok(())
    }
}

/// Observer that forwards timestamped [`NodeEvent`] records onto an
/// unbounded channel for the caller to drain.
pub struct ChannelObserver {
    execution_id: String,
    tx: mpsc::UnboundedSender<NodeEvent>,
}

impl ChannelObserver {
    pub fn new(execution_id: impl Into<String>, tx: mpsc::UnboundedSender<NodeEvent>) -> Self {
        Self {
            execution_id: execution_id.into(),
            tx,
        }
    }
}

#[async_trait]
impl ExecutionObserver for ChannelObserver {
    async fn on_node_event(&self, node: &WorkflowNode, kind: NodeEventKind) -> Result<()> {
        let event = NodeEvent {
            execution_id: self.execution_id.clone(),
            node_id: node.id.clone(),
            event_type: kind,
            at: chrono::Utc::now(),
        };
        // A dropped receiver means the host stopped listening; treat it the
        // same as any other observer failure.
        self.tx
            .send(event)
            .map_err(|_| Error::Observer("event channel receiver dropped".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::NodeConfig;

    fn delay_node() -> WorkflowNode {
        WorkflowNode {
            id: "wait".to_string(),
            config: NodeConfig::Delay { hours: 2.0 },
        }
    }

    #[test]
    fn test_event_kind_wire_names() {
        assert_eq!(NodeEventKind::ActionExecuted.as_str(), "node.action.executed");
        assert_eq!(NodeEventKind::ConditionHalted.as_str(), "node.condition.halted");
        assert_eq!(NodeEventKind::DelayRecorded.to_string(), "node.delay.recorded");

        // Serialized form matches the wire name
        assert_eq!(
            serde_json::to_value(NodeEventKind::ActionExecuted).unwrap(),
            serde_json::json!("node.action.executed")
        );
    }

    #[tokio::test]
    async fn test_channel_observer_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let observer = ChannelObserver::new("exec-1", tx);

        observer
            .on_node_event(&delay_node(), NodeEventKind::DelayRecorded)
            .await
            .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.execution_id, "exec-1");
        assert_eq!(event.node_id, "wait");
        assert_eq!(event.event_type, NodeEventKind::DelayRecorded);
    }

    #[tokio::test]
    async fn test_channel_observer_fails_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let observer = ChannelObserver::new("exec-1", tx);

        let err = observer
            .on_node_event(&delay_node(), NodeEventKind::DelayRecorded)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "observer_error");
    }
}
