//! `email.send` - send a templated or free-form email.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::template::render;
use super::{ActionContext, ActionHandler, ActionReceipt, SharedTransport};
use crate::error::{Error, Result};

/// Email send action.
pub struct EmailSendAction {
    transport: SharedTransport,
}

impl EmailSendAction {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }
}

#[derive(Debug, Deserialize)]
struct EmailParams {
    /// Recipient address(es); supports `{{ path }}` placeholders
    to: StringOrVec,

    /// Name of a stored template to send
    #[serde(default)]
    template: Option<String>,

    /// Subject line (free-form sends)
    #[serde(default)]
    subject: Option<String>,

    /// Plain-text body (free-form sends)
    #[serde(default)]
    body: Option<String>,

    /// Sender override; the workspace default applies when absent
    #[serde(default)]
    from: Option<String>,

    /// Reply-to override
    #[serde(default)]
    reply_to: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    fn to_vec(&self) -> Vec<String> {
        match self {
            StringOrVec::Single(s) => vec![s.clone()],
            StringOrVec::Multiple(v) => v.clone(),
        }
    }
}

#[async_trait]
impl ActionHandler for EmailSendAction {
    fn action_id(&self) -> &str {
        "email.send"
    }

    fn description(&self) -> &str {
        "Send an email through the workspace email channel"
    }

    async fn dispatch(&self, params: &Value, ctx: &ActionContext) -> Result<ActionReceipt> {
        let params: EmailParams = serde_json::from_value(params.clone())
            .map_err(|e| Error::Action(format!("Invalid email.send params: {}", e)))?;

        if params.template.is_none() && params.body.is_none() {
            return Err(Error::Action(
                "email.send requires 'template' or 'body'".to_string(),
            ));
        }

        let recipients: Vec<String> = params
            .to
            .to_vec()
            .iter()
            .map(|to| render(to, &ctx.payload))
            .collect();

        debug!(
            to = ?recipients,
            template = ?params.template,
            execution_id = %ctx.execution_id,
            "sending email"
        );

        let message = json!({
            "tenantId": ctx.tenant_id,
            "clientId": ctx.client_id,
            "executionId": ctx.execution_id,
            "to": recipients,
            "from": params.from,
            "replyTo": params.reply_to,
            "template": params.template,
            "subject": params.subject.as_deref().map(|s| render(s, &ctx.payload)),
            "body": params.body.as_deref().map(|b| render(b, &ctx.payload)),
        });

        let detail = self.transport.deliver("email", message).await?;
        Ok(ActionReceipt {
            action: self.action_id().to_string(),
            channel: "email".to_string(),
            detail,
        })
    }
}
