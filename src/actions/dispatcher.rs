//! Action dispatcher - the allow-list of channel actions.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::{
    ActionContext, ActionHandler, ActionReceipt, EmailSendAction, SharedTransport, SmsSendAction,
    SocialPostAction, WhatsAppTemplateAction,
};
use crate::error::{Error, Result};

/// Registry of supported channel actions.
///
/// The set of registered handlers IS the allow-list: an action identifier
/// with no handler always fails with `unsupported_action`, never a silent
/// no-op.
#[derive(Clone)]
pub struct ActionDispatcher {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionDispatcher {
    /// Create a dispatcher with the built-in channel actions, all wired to
    /// the given transport.
    pub fn new(transport: SharedTransport) -> Self {
        let mut dispatcher = Self::empty();
        dispatcher.register(Arc::new(EmailSendAction::new(transport.clone())));
        dispatcher.register(Arc::new(WhatsAppTemplateAction::new(transport.clone())));
        dispatcher.register(Arc::new(SmsSendAction::new(transport.clone())));
        dispatcher.register(Arc::new(SocialPostAction::new(transport)));
        dispatcher
    }

    /// Create an empty dispatcher (for testing).
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register an action handler.
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers
            .insert(handler.action_id().to_string(), handler);
    }

    /// Whether an action identifier is on the allow-list.
    pub fn supports(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    /// Get a handler by action identifier.
    pub fn get(&self, action: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(action).cloned()
    }

    /// Supported action identifiers, sorted for stable output.
    pub fn supported_actions(&self) -> Vec<&str> {
        let mut actions: Vec<&str> = self.handlers.keys().map(|s| s.as_str()).collect();
        actions.sort_unstable();
        actions
    }

    /// Dispatch an action by identifier.
    pub async fn dispatch(
        &self,
        action: &str,
        params: &Value,
        ctx: &ActionContext,
    ) -> Result<ActionReceipt> {
        let handler = self.get(action).ok_or_else(|| Error::UnsupportedAction {
            action: action.to_string(),
        })?;

        debug!(
            action = %action,
            execution_id = %ctx.execution_id,
            tenant_id = %ctx.tenant_id,
            "dispatching action"
        );
        handler.dispatch(params, ctx).await
    }
}
