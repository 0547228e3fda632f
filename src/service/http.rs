//! HTTP implementation of the remote service

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

use super::{AppConfigService, ServiceError, ServiceResult};
use crate::config::ApiConfig;
use crate::models::{
    AppConfig, AppConfigCreateInput, AppConfigPatch, AppConfigUpdateInput, BatchPayload, DeletedId,
    ExportFile, FindManyParams, PaginatedResult,
};

/// JSON-over-HTTP client for the AppConfig REST resource
///
/// Routes, relative to `{baseUrl}{resourcePath}`:
/// `GET /`, `GET /export`, `GET /{id}`, `POST /`, `POST /createMany`,
/// `PATCH /{id}`, `DELETE /{id}`.
pub struct HttpAppConfigService {
    client: reqwest::Client,
    base: Url,
}

impl HttpAppConfigService {
    /// Create a client from the API section of the configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let base = resource_url(&config.base_url, &config.resource_path)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        tracing::debug!("Created HTTP AppConfig service for: {}", base);

        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ServiceResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(match response.text().await {
                Ok(body) => error_from_body(status, &body),
                Err(e) => unreadable_body(status, &e),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::new(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Join the base URL and the resource path into one base for all routes
fn resource_url(base_url: &str, resource_path: &str) -> Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API base URL cannot carry a path: {}", base_url))?;
        path.pop_if_empty();
        path.extend(resource_path.split('/').filter(|s| !s.is_empty()));
    }

    Ok(url)
}

/// Build the error for a non-2xx response; JSON bodies become the payload
fn error_from_body(status: StatusCode, body: &str) -> ServiceError {
    let payload =
        serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string()));
    ServiceError::with_payload(format!("HTTP request failed (status: {})", status), payload)
}

/// Build the error for a non-2xx response whose body could not be read
fn unreadable_body(status: StatusCode, err: &reqwest::Error) -> ServiceError {
    ServiceError::with_payload(
        format!("HTTP request failed (status: {})", status),
        json!({
            "statusCode": status.as_u16(),
            "message": format!("Failed to read response body: {}", err),
        }),
    )
}

#[async_trait]
impl AppConfigService for HttpAppConfigService {
    async fn find_many(&self, params: FindManyParams) -> ServiceResult<PaginatedResult> {
        let url = self.endpoint(&[]);
        tracing::debug!("GET {} {:?}", url, params);

        let response = self.client.get(url).query(&params).send().await?;
        self.read_json(response).await
    }

    async fn find_one_for_export(&self) -> ServiceResult<ExportFile> {
        let url = self.endpoint(&["export"]);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        self.read_json(response).await
    }

    async fn find_one(&self, id: &str) -> ServiceResult<AppConfig> {
        let url = self.endpoint(&[id]);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        self.read_json(response).await
    }

    async fn create(&self, data: AppConfigCreateInput) -> ServiceResult<AppConfig> {
        let url = self.endpoint(&[]);
        tracing::debug!("POST {}", url);

        let response = self.client.post(url).json(&data).send().await?;
        self.read_json(response).await
    }

    async fn create_many(&self, data: Vec<AppConfigCreateInput>) -> ServiceResult<BatchPayload> {
        let url = self.endpoint(&["createMany"]);
        tracing::debug!("POST {} ({} items)", url, data.len());

        let response = self.client.post(url).json(&data).send().await?;
        self.read_json(response).await
    }

    async fn update(&self, id: &str, data: AppConfigUpdateInput) -> ServiceResult<AppConfigPatch> {
        let url = self.endpoint(&[id]);
        tracing::debug!("PATCH {}", url);

        let response = self.client.patch(url).json(&data).send().await?;
        self.read_json(response).await
    }

    async fn delete(&self, id: &str) -> ServiceResult<DeletedId> {
        let url = self.endpoint(&[id]);
        tracing::debug!("DELETE {}", url);

        let response = self.client.delete(url).send().await?;
        self.read_json(response).await
    }

    fn service_type(&self) -> &'static str {
        "http"
    }
}
