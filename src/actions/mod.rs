//! Channel action handlers.
//!
//! Actions are the side-effecting steps of a workflow. Each handler owns
//! one allow-listed action identifier (e.g. `email.send`), validates its
//! parameters, renders payload placeholders, and hands the finished message
//! to a [`ChannelTransport`] — the seam behind which the real channel
//! senders (SMTP relay, WhatsApp Business API, social schedulers) live.
//! This crate itself performs no network I/O.

mod dispatcher;
mod email;
mod sms;
mod social;
pub mod template;
mod whatsapp;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub use dispatcher::ActionDispatcher;
pub use email::EmailSendAction;
pub use sms::SmsSendAction;
pub use social::SocialPostAction;
pub use whatsapp::WhatsAppTemplateAction;

/// Context passed to an action handler during dispatch.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// Owning tenant
    pub tenant_id: String,

    /// Owning client workspace
    pub client_id: String,

    /// Workflow being executed
    pub workflow_id: String,

    /// Execution this dispatch belongs to
    pub execution_id: String,

    /// Trigger payload, used to render `{{ path }}` placeholders
    pub payload: Value,
}

/// Result of a successful dispatch.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionReceipt {
    /// Action identifier that was performed
    pub action: String,

    /// Channel the message was delivered through
    pub channel: String,

    /// Transport response detail
    pub detail: Value,
}

/// Trait that all action handlers implement.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// The allow-listed action identifier (e.g. "email.send").
    fn action_id(&self) -> &str;

    /// Validate `params`, build the outbound message, and deliver it.
    async fn dispatch(&self, params: &Value, ctx: &ActionContext) -> Result<ActionReceipt>;

    /// Human-readable description of this action.
    fn description(&self) -> &str {
        "A channel action"
    }
}

/// Seam to the real channel senders.
///
/// Implementations live outside this crate and own retries, provider
/// credentials, and wire formats. `deliver` returns the provider response
/// detail; failures surface verbatim and abort the run that dispatched
/// the action.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    async fn deliver(&self, channel: &str, message: Value) -> Result<Value>;
}

/// Transport that records deliveries in memory instead of sending them.
///
/// Used for tests and for dry runs, where a host wants to preview exactly
/// what a workflow would send without touching any channel.
#[derive(Default)]
pub struct RecordingTransport {
    deliveries: std::sync::Mutex<Vec<(String, Value)>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of `(channel, message)` pairs delivered so far.
    pub fn deliveries(&self) -> Vec<(String, Value)> {
        self.deliveries.lock().expect("deliveries lock").clone()
    }
}

#[async_trait]
impl ChannelTransport for RecordingTransport {
    async fn deliver(&self, channel: &str, message: Value) -> Result<Value> {
        let mut deliveries = self.deliveries.lock().expect("deliveries lock");
        deliveries.push((channel.to_string(), message));
        Ok(serde_json::json!({ "recorded": true, "sequence": deliveries.len() }))
    }
}

/// Shorthand for the shared transport handle handlers hold.
pub type SharedTransport = Arc<dyn ChannelTransport>;

#[cfg(test)]
pub(crate) fn test_context() -> ActionContext {
    ActionContext {
        tenant_id: "tn-test".to_string(),
        client_id: "cl-test".to_string(),
        workflow_id: "wf-test".to_string(),
        execution_id: "exec-test".to_string(),
        payload: serde_json::json!({
            "lead": { "email": "dana@example.com", "name": "Dana", "phone": "+15550100" }
        }),
    }
}
