//! `social.post` - publish a post to a connected social network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::template::render;
use super::{ActionContext, ActionHandler, ActionReceipt, SharedTransport};
use crate::error::{Error, Result};

const SUPPORTED_NETWORKS: [&str; 3] = ["instagram", "facebook", "linkedin"];

pub struct SocialPostAction {
    transport: SharedTransport,
}

impl SocialPostAction {
    pub fn new(transport: SharedTransport) -> Self {
        Self { transport }
    }
}

#[derive(Debug, Deserialize)]
struct SocialParams {
    /// Target network (instagram, facebook, linkedin)
    network: String,

    /// Post text; supports placeholders
    text: String,

    /// Optional media attachment URL
    #[serde(default)]
    media_url: Option<String>,
}

#[async_trait]
impl ActionHandler for SocialPostAction {
    fn action_id(&self) -> &str {
        "social.post"
    }

    fn description(&self) -> &str {
        "Publish a post to a connected social network"
    }

    async fn dispatch(&self, params: &Value, ctx: &ActionContext) -> Result<ActionReceipt> {
        let params: SocialParams = serde_json::from_value(params.clone())
            .map_err(|e| Error::Action(format!("Invalid social.post params: {}", e)))?;

        let network = params.network.to_lowercase();
        if !SUPPORTED_NETWORKS.contains(&network.as_str()) {
            return Err(Error::Action(format!(
                "Unknown social network '{}', expected one of {}",
                params.network,
                SUPPORTED_NETWORKS.join(", ")
            )));
        }

        debug!(network = %network, execution_id = %ctx.execution_id, "publishing social post");

        let message = json!({
            "tenantId": ctx.tenant_id,
            "clientId": ctx.client_id,
            "executionId": ctx.execution_id,
            "network": network,
            "text": render(&params.text, &ctx.payload),
            "mediaUrl": params.media_url,
        });

        let detail = self.transport.deliver("social", message).await?;
        Ok(ActionReceipt {
            action: self.action_id().to_string(),
            channel: "social".to_string(),
            detail,
        })
    }
}
