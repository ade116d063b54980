//! Deterministic workflow runtime.
//!
//! One call to [`Runtime::run`] executes one workflow against one trigger
//! event. Nodes run strictly sequentially in definition order - node order
//! IS the execution order, there is no dependency graph to resolve - because
//! later nodes depend on the side effects and control decisions of earlier
//! ones.
//!
//! The runtime never sleeps (delay nodes are recorded, not waited on),
//! never retries, and never rolls back: side effects performed before a
//! failing node stay performed, and the external executor that owns the
//! `execution_id` decides what happens next.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::events::{ExecutionObserver, NodeEventKind};
use super::limiter::{enforce_safety_limits, SafetyLimitCheck};
use crate::actions::template::resolve_path;
use crate::actions::{ActionContext, ActionDispatcher};
use crate::error::{Error, Result};
use crate::workflow::{ConditionOperator, NodeConfig, WorkflowDefinition};

/// One triggering business event.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEvent {
    /// Event type that fired (e.g. "lead.inactive")
    pub trigger_type: String,

    /// Arbitrary event payload; condition paths and `{{ }}` placeholders
    /// resolve against this
    #[serde(default)]
    pub trigger_payload: Value,

    /// Caller-supplied idempotency/correlation token. Deduplication across
    /// retries of the same id is the durable store's job, not ours.
    pub execution_id: String,
}

impl TriggerEvent {
    /// Create an event with a generated execution id.
    pub fn new(trigger_type: impl Into<String>, trigger_payload: Value) -> Self {
        Self {
            trigger_type: trigger_type.into(),
            trigger_payload,
            execution_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Replace the generated execution id with a caller-supplied one.
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = execution_id.into();
        self
    }
}

/// Summary of one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    /// Action nodes successfully dispatched
    pub actions_executed: u32,
}

/// Workflow runtime.
pub struct Runtime {
    dispatcher: ActionDispatcher,
}

impl Runtime {
    /// Create a runtime over the given action allow-list.
    pub fn new(dispatcher: ActionDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &ActionDispatcher {
        &self.dispatcher
    }

    /// Execute a workflow against one trigger event.
    ///
    /// `max_actions` is the hard cap on dispatched actions for this run;
    /// `observer` is awaited for every node event and aborts the run by
    /// returning an error. A condition gate closing via `stopOnFalse` is a
    /// normal successful termination, not an error.
    #[instrument(
        name = "workflow.run",
        skip(self, workflow, event, observer),
        fields(
            workflow_id = %workflow.id,
            workflow_name = %workflow.name,
            trigger_type = %event.trigger_type,
            execution_id = %event.execution_id,
        )
    )]
    pub async fn run(
        &self,
        workflow: &WorkflowDefinition,
        event: &TriggerEvent,
        max_actions: u32,
        observer: &dyn ExecutionObserver,
    ) -> Result<ExecutionOutcome> {
        info!(
            version = workflow.version,
            status = workflow.status.as_str(),
            max_actions,
            "starting execution"
        );

        let ctx = ActionContext {
            tenant_id: workflow.tenant_id.clone(),
            client_id: workflow.client_id.clone(),
            workflow_id: workflow.id.clone(),
            execution_id: event.execution_id.clone(),
            payload: event.trigger_payload.clone(),
        };

        let mut actions_executed: u32 = 0;

        for node in &workflow.nodes {
            match &node.config {
                NodeConfig::Trigger { event: declared } => {
                    // Advisory only: the caller routed this event here, and a
                    // mismatch with the declared event name is not rejected.
                    debug!(node_id = %node.id, declared = %declared, "trigger node observed");
                    observer
                        .on_node_event(node, NodeEventKind::TriggerObserved)
                        .await?;
                }

                NodeConfig::Condition {
                    operator,
                    path,
                    stop_on_false,
                    pattern,
                } => {
                    let resolved = resolve_path(&event.trigger_payload, path);
                    let passed =
                        evaluate_condition(*operator, resolved.as_ref(), pattern.as_deref())?;

                    if passed {
                        debug!(node_id = %node.id, path = %path, "condition passed");
                        observer
                            .on_node_event(node, NodeEventKind::ConditionPassed)
                            .await?;
                    } else if *stop_on_false {
                        info!(
                            node_id = %node.id,
                            path = %path,
                            actions_executed,
                            "condition gate closed, ending run"
                        );
                        observer
                            .on_node_event(node, NodeEventKind::ConditionHalted)
                            .await?;
                        return Ok(ExecutionOutcome { actions_executed });
                    } else {
                        debug!(node_id = %node.id, path = %path, "condition failed, continuing");
                        observer
                            .on_node_event(node, NodeEventKind::ConditionFailed)
                            .await?;
                    }
                }

                NodeConfig::Action { action, params } => {
                    if !self.dispatcher.supports(action) {
                        warn!(node_id = %node.id, action = %action, "action not on allow-list");
                        return Err(Error::UnsupportedAction {
                            action: action.clone(),
                        });
                    }

                    enforce_safety_limits(&SafetyLimitCheck {
                        max_actions,
                        pending_approvals: 0,
                        requested_actions: actions_executed + 1,
                    })?;

                    self.dispatcher.dispatch(action, params, &ctx).await?;
                    actions_executed += 1;

                    info!(node_id = %node.id, action = %action, actions_executed, "action executed");
                    observer
                        .on_node_event(node, NodeEventKind::ActionExecuted)
                        .await?;
                }

                NodeConfig::Delay { hours } => {
                    // Recorded for the external scheduler; the runtime stays
                    // replay-safe by never touching the wall clock.
                    debug!(node_id = %node.id, hours, "delay recorded");
                    observer
                        .on_node_event(node, NodeEventKind::DelayRecorded)
                        .await?;
                }
            }
        }

        info!(actions_executed, "execution finished");
        Ok(ExecutionOutcome { actions_executed })
    }
}

/// Apply a condition operator to a resolved payload value.
fn evaluate_condition(
    operator: ConditionOperator,
    value: Option<&Value>,
    pattern: Option<&str>,
) -> Result<bool> {
    match operator {
        ConditionOperator::IsTrue => Ok(matches!(value, Some(Value::Bool(true)))),
        ConditionOperator::IsFalse => Ok(matches!(value, Some(Value::Bool(false)))),
        ConditionOperator::Exists => Ok(matches!(value, Some(v) if !v.is_null())),
        ConditionOperator::NotEmpty => Ok(match value {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }),
        ConditionOperator::Matches => {
            let pattern = pattern.ok_or_else(|| {
                Error::Workflow("'matches' operator requires a pattern".to_string())
            })?;
            let regex = regex_lite::Regex::new(pattern)
                .map_err(|e| Error::Workflow(format!("Invalid pattern '{}': {}", pattern, e)))?;
            let text = match value {
                Some(Value::String(s)) => s.clone(),
                Some(v) => v.to_string(),
                None => return Ok(false),
            };
            Ok(regex.is_match(&text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ChannelTransport, RecordingTransport};
    use crate::engine::events::NullObserver;
    use crate::workflow::{WorkflowMetadata, WorkflowNode, WorkflowStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn workflow(nodes: Vec<WorkflowNode>, actions: Vec<&str>) -> WorkflowDefinition {
        WorkflowDefinition {
            id: "wf-1".to_string(),
            tenant_id: "tn-1".to_string(),
            client_id: "cl-1".to_string(),
            name: "lead-inactivity-nudge".to_string(),
            version: 1,
            status: WorkflowStatus::Approved,
            triggers: vec!["lead.inactive".to_string()],
            nodes,
            actions: actions.into_iter().map(String::from).collect(),
            conditions: vec!["no_reply".to_string()],
            metadata: WorkflowMetadata {
                created_by: "u-1".to_string(),
                created_at: chrono::Utc::now(),
                intent: None,
            },
        }
    }

    fn trigger_node() -> WorkflowNode {
        WorkflowNode {
            id: "on-inactive".to_string(),
            config: NodeConfig::Trigger {
                event: "lead.inactive".to_string(),
            },
        }
    }

    fn gate_node(stop_on_false: bool) -> WorkflowNode {
        WorkflowNode {
            id: "gate".to_string(),
            config: NodeConfig::Condition {
                operator: ConditionOperator::IsTrue,
                path: "noReply".to_string(),
                stop_on_false,
                pattern: None,
            },
        }
    }

    fn email_node(id: &str) -> WorkflowNode {
        WorkflowNode {
            id: id.to_string(),
            config: NodeConfig::Action {
                action: "email.send".to_string(),
                params: json!({ "to": "dana@example.com", "template": "gentle-nudge" }),
            },
        }
    }

    /// Observer that records `(node_id, event_type)` pairs.
    #[derive(Default)]
    struct CollectingObserver {
        events: Mutex<Vec<(String, &'static str)>>,
    }

    impl CollectingObserver {
        fn events(&self) -> Vec<(String, &'static str)> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutionObserver for CollectingObserver {
        async fn on_node_event(&self, node: &WorkflowNode, kind: NodeEventKind) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push((node.id.clone(), kind.as_str()));
            Ok(())
        }
    }

    /// Observer that fails on the first event.
    struct FailingObserver;

    #[async_trait]
    impl ExecutionObserver for FailingObserver {
        async fn on_node_event(&self, _node: &WorkflowNode, _kind: NodeEventKind) -> Result<()> {
            Err(Error::Observer("event log unavailable".to_string()))
        }
    }

    /// Transport that fails after a fixed number of deliveries.
    struct FlakyTransport {
        inner: RecordingTransport,
        fail_after: usize,
    }

    #[async_trait]
    impl ChannelTransport for FlakyTransport {
        async fn deliver(&self, channel: &str, message: Value) -> Result<Value> {
            if self.inner.deliveries().len() >= self.fail_after {
                return Err(Error::Channel("smtp relay unavailable".to_string()));
            }
            self.inner.deliver(channel, message).await
        }
    }

    fn runtime_with(transport: Arc<dyn ChannelTransport>) -> Runtime {
        Runtime::new(ActionDispatcher::new(transport))
    }

    fn nudge_event(no_reply: bool) -> TriggerEvent {
        TriggerEvent::new("lead.inactive", json!({ "noReply": no_reply }))
            .with_execution_id("exec-1")
    }

    #[tokio::test]
    async fn test_gated_action_runs_when_condition_holds() {
        let transport = Arc::new(RecordingTransport::new());
        let runtime = runtime_with(transport.clone());
        let wf = workflow(
            vec![trigger_node(), gate_node(true), email_node("nudge")],
            vec!["email.send"],
        );
        let observer = CollectingObserver::default();

        let outcome = runtime
            .run(&wf, &nudge_event(true), 5, &observer)
            .await
            .unwrap();

        assert_eq!(outcome.actions_executed, 1);
        assert_eq!(transport.deliveries().len(), 1);
        assert!(observer
            .events()
            .contains(&("nudge".to_string(), "node.action.executed")));
    }

    #[tokio::test]
    async fn test_stop_on_false_ends_run_successfully() {
        let transport = Arc::new(RecordingTransport::new());
        let runtime = runtime_with(transport.clone());
        let wf = workflow(
            vec![trigger_node(), gate_node(true), email_node("nudge")],
            vec!["email.send"],
        );
        let observer = CollectingObserver::default();

        let outcome = runtime
            .run(&wf, &nudge_event(false), 5, &observer)
            .await
            .unwrap();

        assert_eq!(outcome.actions_executed, 0);
        assert!(transport.deliveries().is_empty());
        assert_eq!(
            observer.events().last().unwrap(),
            &("gate".to_string(), "node.condition.halted")
        );
    }

    #[tokio::test]
    async fn test_failing_condition_without_stop_continues() {
        let transport = Arc::new(RecordingTransport::new());
        let runtime = runtime_with(transport.clone());
        let wf = workflow(
            vec![gate_node(false), email_node("nudge")],
            vec!["email.send"],
        );

        let outcome = runtime
            .run(&wf, &nudge_event(false), 5, &NullObserver)
            .await
            .unwrap();

        assert_eq!(outcome.actions_executed, 1);
    }

    #[tokio::test]
    async fn test_unlisted_action_rejected() {
        let runtime = runtime_with(Arc::new(RecordingTransport::new()));
        let wf = workflow(
            vec![WorkflowNode {
                id: "rogue".to_string(),
                config: NodeConfig::Action {
                    action: "shell.exec".to_string(),
                    params: json!({ "cmd": "rm -rf /" }),
                },
            }],
            vec!["shell.exec"],
        );

        let err = runtime
            .run(&wf, &nudge_event(true), 5, &NullObserver)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "unsupported_action");
        assert!(err.to_string().contains("unsupported_action"));
    }

    #[tokio::test]
    async fn test_cap_zero_rejects_first_action() {
        let runtime = runtime_with(Arc::new(RecordingTransport::new()));
        let wf = workflow(vec![email_node("nudge")], vec!["email.send"]);

        let err = runtime
            .run(&wf, &nudge_event(true), 0, &NullObserver)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "execution_cap_exceeded");
    }

    #[tokio::test]
    async fn test_cap_allows_exactly_max_actions() {
        let transport = Arc::new(RecordingTransport::new());
        let runtime = runtime_with(transport.clone());
        let wf = workflow(
            vec![email_node("a1"), email_node("a2")],
            vec!["email.send"],
        );

        let outcome = runtime
            .run(&wf, &nudge_event(true), 2, &NullObserver)
            .await
            .unwrap();
        assert_eq!(outcome.actions_executed, 2);

        // Third action breaches the cap; the first two stay sent.
        let wf3 = workflow(
            vec![email_node("a1"), email_node("a2"), email_node("a3")],
            vec!["email.send"],
        );
        let err = runtime
            .run(&wf3, &nudge_event(true), 2, &NullObserver)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "execution_cap_exceeded");
        assert_eq!(transport.deliveries().len(), 4);
    }

    #[tokio::test]
    async fn test_workflow_without_actions_succeeds() {
        let runtime = runtime_with(Arc::new(RecordingTransport::new()));
        let wf = workflow(
            vec![
                trigger_node(),
                WorkflowNode {
                    id: "wait".to_string(),
                    config: NodeConfig::Delay { hours: 48.0 },
                },
            ],
            vec!["email.send"],
        );
        let observer = CollectingObserver::default();

        let outcome = runtime
            .run(&wf, &nudge_event(true), 5, &observer)
            .await
            .unwrap();

        assert_eq!(outcome.actions_executed, 0);
        assert_eq!(
            observer.events(),
            vec![
                ("on-inactive".to_string(), "node.trigger.observed"),
                ("wait".to_string(), "node.delay.recorded"),
            ]
        );
    }

    #[tokio::test]
    async fn test_trigger_type_mismatch_is_not_rejected() {
        let transport = Arc::new(RecordingTransport::new());
        let runtime = runtime_with(transport.clone());
        let wf = workflow(
            vec![trigger_node(), email_node("nudge")],
            vec!["email.send"],
        );

        // Declared event is lead.inactive; the caller routed something else.
        let event = TriggerEvent::new("form.submitted", json!({})).with_execution_id("exec-2");
        let outcome = runtime.run(&wf, &event, 5, &NullObserver).await.unwrap();

        assert_eq!(outcome.actions_executed, 1);
    }

    #[tokio::test]
    async fn test_observer_failure_aborts_run() {
        let transport = Arc::new(RecordingTransport::new());
        let runtime = runtime_with(transport.clone());
        let wf = workflow(
            vec![email_node("a1"), email_node("a2")],
            vec!["email.send"],
        );

        let err = runtime
            .run(&wf, &nudge_event(true), 5, &FailingObserver)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "observer_error");
        // The first action was dispatched before its event failed; nothing
        // is rolled back and the second action never ran.
        assert_eq!(transport.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_failure_surfaces_verbatim() {
        let transport = Arc::new(FlakyTransport {
            inner: RecordingTransport::new(),
            fail_after: 1,
        });
        let runtime = runtime_with(transport);
        let wf = workflow(
            vec![email_node("a1"), email_node("a2")],
            vec!["email.send"],
        );

        let err = runtime
            .run(&wf, &nudge_event(true), 5, &NullObserver)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "channel_error");
        assert!(err.to_string().contains("smtp relay unavailable"));
    }

    #[tokio::test]
    async fn test_matches_operator_gates_on_pattern() {
        let runtime = runtime_with(Arc::new(RecordingTransport::new()));
        let wf = workflow(
            vec![
                WorkflowNode {
                    id: "gate".to_string(),
                    config: NodeConfig::Condition {
                        operator: ConditionOperator::Matches,
                        path: "lead.email".to_string(),
                        stop_on_false: true,
                        pattern: Some(r".+@example\.com$".to_string()),
                    },
                },
                email_node("nudge"),
            ],
            vec!["email.send"],
        );

        let hit = TriggerEvent::new(
            "lead.inactive",
            json!({ "lead": { "email": "dana@example.com" } }),
        );
        let miss = TriggerEvent::new(
            "lead.inactive",
            json!({ "lead": { "email": "dana@rival.io" } }),
        );

        let outcome = runtime.run(&wf, &hit, 5, &NullObserver).await.unwrap();
        assert_eq!(outcome.actions_executed, 1);

        let outcome = runtime.run(&wf, &miss, 5, &NullObserver).await.unwrap();
        assert_eq!(outcome.actions_executed, 0);
    }

    #[test]
    fn test_evaluate_condition_operators() {
        use ConditionOperator::*;

        assert!(evaluate_condition(IsTrue, Some(&json!(true)), None).unwrap());
        assert!(!evaluate_condition(IsTrue, Some(&json!("true")), None).unwrap());
        assert!(!evaluate_condition(IsTrue, Some(&json!(1)), None).unwrap());
        assert!(!evaluate_condition(IsTrue, None, None).unwrap());

        assert!(evaluate_condition(IsFalse, Some(&json!(false)), None).unwrap());
        assert!(!evaluate_condition(IsFalse, Some(&json!(0)), None).unwrap());

        assert!(evaluate_condition(Exists, Some(&json!(0)), None).unwrap());
        assert!(!evaluate_condition(Exists, Some(&json!(null)), None).unwrap());
        assert!(!evaluate_condition(Exists, None, None).unwrap());

        assert!(evaluate_condition(NotEmpty, Some(&json!("x")), None).unwrap());
        assert!(!evaluate_condition(NotEmpty, Some(&json!("")), None).unwrap());
        assert!(!evaluate_condition(NotEmpty, Some(&json!([])), None).unwrap());
        assert!(evaluate_condition(NotEmpty, Some(&json!([1])), None).unwrap());

        assert!(evaluate_condition(Matches, Some(&json!("abc")), Some("^a")).unwrap());
        assert!(evaluate_condition(Matches, None, Some("^a")).is_ok());
        assert!(evaluate_condition(Matches, Some(&json!("abc")), None).is_err());
    }

    #[test]
    fn test_trigger_event_generates_execution_id() {
        let a = TriggerEvent::new("lead.inactive", json!({}));
        let b = TriggerEvent::new("lead.inactive", json!({}));
        assert!(!a.execution_id.is_empty());
        assert_ne!(a.execution_id, b.execution_id);
    }
}
