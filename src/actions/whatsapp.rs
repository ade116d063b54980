//! `whatsapp.send_template` - send an approved WhatsApp template message.
//!
//! WhatsApp only allows pre-approved templates for business-initiated
//! conversations, so unlike email there is no free-form body variant.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::template::{render, render_value};
use super::{ActionContext, ActionHandler, ActionReceipt, SharedTransport};
use crate::error::{Error, Result};

/// WhatsApp template send action.
pub struct WhatsAppTemplateAction {
    transport: SharedTransport,
}

impl WhatsAppTemplateAction {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }
}

#[derive(Debug, Deserialize)]
struct WhatsAppParams {
    /// Recipient phone number in E.164; supports placeholders
    to: String,

    /// Approved template name
    template: String,

    /// Template language code
    #[serde(default = "default_language")]
    language: String,

    /// Template variable substitutions
    #[serde(default)]
    variables: Value,
}

fn default_language() -> String {
    "en".to_string()
}

#[async_trait]
impl ActionHandler for WhatsAppTemplateAction {
    fn action_id(&self) -> &str {
        "whatsapp.send_template"
    }

    fn description(&self) -> &str {
        "Send an approved WhatsApp template message"
    }

    async fn dispatch(&self, params: &Value, ctx: &ActionContext) -> Result<ActionReceipt> {
        let params: WhatsAppParams = serde_json::from_value(params.clone())
            .map_err(|e| Error::Action(format!("Invalid whatsapp.send_template params: {}", e)))?;

        if params.template.is_empty() {
            return Err(Error::Action(
                "whatsapp.send_template requires a template name".to_string(),
            ));
        }

        let to = render(&params.to, &ctx.payload);

        debug!(
            to = %to,
            template = %params.template,
            language = %params.language,
            execution_id = %ctx.execution_id,
            "sending whatsapp template"
        );

        let message = json!({
            "tenantId": ctx.tenant_id,
            "clientId": ctx.client_id,
            "executionId": ctx.execution_id,
            "to": to,
            "template": params.template,
            "language": params.language,
            "variables": render_value(&params.variables, &ctx.payload),
        });

        let detail = self.transport.deliver("whatsapp", message).await?;
        Ok(ActionReceipt {
            action: self.action_id().to_string(),
            channel: "whatsapp".to_string(),
            detail,
        })
    }
}
