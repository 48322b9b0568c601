//! Bot deployment and username availability clients
//!
//! These hit two endpoints unrelated to the step API: the Matrix
//! registration availability check and the bot hosting service. Both are
//! best-effort; failures surface to the host as notifications and never
//! touch editor core state.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::api::ApiError;
use crate::config::Config;
use crate::types::Workflow;

const MATRIX_ENDPOINT: &str = "matrix";
const BOTS_ENDPOINT: &str = "bots";

/// Deployment request body for the bot hosting service.
#[derive(Debug, Clone, Serialize)]
pub struct DeployRequest {
    pub api_key: String,
    pub bot_username: String,
    pub workflow_name: String,
    pub workflow_description: String,
    pub workflow_id: String,
    pub tags: String,
    pub publish: bool,
}

impl DeployRequest {
    /// Build a request for deploying `workflow` under `bot_username`.
    pub fn for_workflow(
        workflow: &Workflow,
        api_key: impl Into<String>,
        bot_username: impl Into<String>,
        tags: impl Into<String>,
        publish: bool,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            bot_username: bot_username.into(),
            workflow_name: workflow.name.clone(),
            workflow_description: workflow.description.clone(),
            workflow_id: workflow.id.clone(),
            tags: tags.into(),
            publish,
        }
    }
}

/// Client for the deploy-time endpoints.
pub struct DeployClient {
    client: Client,
    bots_base_url: String,
    matrix_base_url: String,
}

impl DeployClient {
    pub fn new(bots_base_url: impl Into<String>, matrix_base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            bots_base_url: bots_base_url.into(),
            matrix_base_url: matrix_base_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.bots_base_url.clone(), config.matrix_base_url.clone())
    }

    /// Check whether a bot username is still available.
    ///
    /// 200 means available, 400 means taken; anything else is an error.
    pub async fn check_username(&self, username: &str) -> Result<bool, ApiError> {
        let url = format!(
            "{}/_matrix/client/v3/register/available",
            self.matrix_base_url
        );
        debug!(username, "checking bot username availability");

        let response = self
            .client
            .get(url)
            .query(&[("username", username)])
            .send()
            .await
            .map_err(|e| ApiError::network(MATRIX_ENDPOINT, e.to_string()))?;

        match response.status().as_u16() {
            200 => Ok(true),
            400 => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ApiError::http(MATRIX_ENDPOINT, status, body))
            }
        }
    }

    /// Deploy a workflow as a bot.
    pub async fn deploy_bot(&self, request: &DeployRequest) -> Result<(), ApiError> {
        let url = format!("{}/add/workflows", self.bots_base_url);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::network(BOTS_ENDPOINT, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            info!(
                workflow_id = %request.workflow_id,
                bot_username = %request.bot_username,
                "bot deployed"
            );
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::http(BOTS_ENDPOINT, status.as_u16(), body))
        }
    }
}
