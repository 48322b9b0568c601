//! REST implementation of the step store

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;
use tracing::debug;

use super::{ApiError, RemoteStep, StepPayload, StepStore};
use crate::config::Config;
use async_trait::async_trait;

const ENDPOINT: &str = "steps";

/// Step store backed by the workflow REST API.
///
/// Endpoints live under `{base}/workflows/{workflow_id}/steps` and
/// responses arrive wrapped in a `{ "data": ... }` envelope.
pub struct RestStepStore {
    base_url: String,
    api_key: String,
    client: Client,
}

/// Response envelope used by every step endpoint.
#[derive(Deserialize)]
struct ApiData<T> {
    data: T,
}

impl RestStepStore {
    /// Create a store for the given API base URL and key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_key: api_key.into(),
            client: Client::new(),
        }
    }

    /// Create from config, resolving the API key from the environment
    /// variable named in `config.api_key_env`.
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        match env::var(&config.api_key_env) {
            Ok(key) if !key.is_empty() => Ok(Self::new(config.api_base_url.clone(), key)),
            _ => Err(ApiError::not_configured(ENDPOINT)),
        }
    }

    fn steps_url(&self, workflow_id: &str) -> String {
        format!("{}/workflows/{}/steps", self.base_url, workflow_id)
    }

    fn step_url(&self, workflow_id: &str, step_id: &str) -> String {
        format!("{}/workflows/{}/steps/{}", self.base_url, workflow_id, step_id)
    }

    /// Map a non-success status into an [`ApiError`], consuming the body
    /// for the error message.
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 => Err(ApiError::unauthorized(ENDPOINT)),
            403 => Err(ApiError::forbidden(ENDPOINT)),
            429 => Err(ApiError::rate_limited(ENDPOINT, retry_after)),
            s => Err(ApiError::http(ENDPOINT, s, body)),
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let envelope: ApiData<T> = response
            .json()
            .await
            .map_err(|e| ApiError::http(ENDPOINT, 0, format!("parse error: {e}")))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl StepStore for RestStepStore {
    async fn fetch_steps(&self, workflow_id: &str) -> Result<Vec<RemoteStep>, ApiError> {
        debug!(workflow_id, "fetching workflow steps");
        let response = self
            .client
            .get(self.steps_url(workflow_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::network(ENDPOINT, e.to_string()))?;

        let response = Self::check_status(response).await?;
        let mut steps: Vec<RemoteStep> = Self::parse(response).await?;
        steps.sort_by_key(|s| s.order);
        Ok(steps)
    }

    async fn create_step(
        &self,
        workflow_id: &str,
        payload: &StepPayload,
    ) -> Result<RemoteStep, ApiError> {
        debug!(workflow_id, order = payload.order, "creating workflow step");
        let response = self
            .client
            .post(self.steps_url(workflow_id))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::network(ENDPOINT, e.to_string()))?;

        let response = Self::check_status(response).await?;
        Self::parse(response).await
    }

    async fn patch_step(
        &self,
        workflow_id: &str,
        step_id: &str,
        payload: &StepPayload,
    ) -> Result<RemoteStep, ApiError> {
        debug!(
            workflow_id,
            step_id,
            order = payload.order,
            "patching workflow step"
        );
        let response = self
            .client
            .patch(self.step_url(workflow_id, step_id))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::network(ENDPOINT, e.to_string()))?;

        let response = Self::check_status(response).await?;
        Self::parse(response).await
    }

    async fn delete_step(&self, workflow_id: &str, step_id: &str) -> Result<(), ApiError> {
        debug!(workflow_id, step_id, "deleting workflow step");
        let response = self
            .client
            .delete(self.step_url(workflow_id, step_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ApiError::network(ENDPOINT, e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }
}
