//! `sms.send` - send a plain SMS.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::template::render;
use super::{ActionContext, ActionHandler, ActionReceipt, SharedTransport};
use crate::error::{Error, Result};

pub struct SmsSendAction {
    transport: SharedTransport,
}

impl SmsSendAction {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }
}

#[derive(Debug, Deserialize)]
struct SmsParams {
    /// Recipient phone number in E.164; supports placeholders
    to: String,

    /// Message body; supports placeholders
    body: String,
}

#[async_trait]
impl ActionHandler for SmsSendAction {
    fn action_id(&self) -> &str {
        "sms.send"
    }

    fn description(&self) -> &str {
        "Send an SMS through the workspace messaging channel"
    }

    async fn dispatch(&self, params: &Value, ctx: &ActionContext) -> Result<ActionReceipt> {
        let params: SmsParams = serde_json::from_value(params.clone())
            .map_err(|e| Error::Action(format!("Invalid sms.send params: {}", e)))?;

        if params.body.trim().is_empty() {
            return Err(Error::Action("sms.send requires a non-empty body".to_string()));
        }

        let to = render(&params.to, &ctx.payload);
        let body = render(&params.body, &ctx.payload);

        debug!(to = %to, execution_id = %ctx.execution_id, "sending sms");

        let message = json!({
            "tenantId": ctx.tenant_id,
            "clientId": ctx.client_id,
            "executionId": ctx.execution_id,
            "to": to,
            "body": body,
        });

        let detail = self.transport.deliver("sms", message).await?;
        Ok(ActionReceipt {
            action: self.action_id().to_string(),
            channel: "sms".to_string(),
            detail,
        })
    }
}
