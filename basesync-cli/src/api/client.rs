//! Airtable meta API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

use super::error::StoreError;
use super::metadata::{SchemaDefinition, TableDefinition};
use super::operations::{BasePayload, FieldPayload, Operation, TablePayload};
use super::resilience::{ClientConfig, PacerStats, RequestPacer};
use super::store::SchemaStore;

/// Response of `GET /bases/{baseId}/tables`
#[derive(Debug, Deserialize)]
struct TablesResponse {
    tables: Vec<TableDefinition>,
}

/// HTTP implementation of [`SchemaStore`] against the Airtable meta API
#[derive(Debug, Clone)]
pub struct AirtableClient {
    http: reqwest::Client,
    api_key: String,
    config: ClientConfig,
    pacer: RequestPacer,
}

impl AirtableClient {
    pub fn new(api_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("basesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_http(http, api_key, config))
    }

    fn with_http(http: reqwest::Client, api_key: impl Into<String>, config: ClientConfig) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            pacer: RequestPacer::new(config.pacing.clone()),
            config,
        }
    }

    pub fn pacer_stats(&self) -> PacerStats {
        self.pacer.stats()
    }

    fn url(&self, operation: &Operation) -> String {
        format!(
            "{}{}",
            self.config.meta_url.trim_end_matches('/'),
            operation.path()
        )
    }

    /// Execute a single operation and return the parsed JSON body
    async fn execute(&self, operation: &Operation) -> Result<Value, StoreError> {
        let url = self.url(operation);
        let endpoint = format!("{} {}", operation.http_method(), operation.path());

        let request = match operation {
            Operation::FetchSchema { .. } => self.http.get(&url),
            Operation::CreateBase { payload } => self.http.post(&url).json(payload),
            Operation::CreateTable { payload, .. } => self.http.post(&url).json(payload),
            Operation::AddField { payload, .. } => self.http.post(&url).json(payload),
        }
        .bearer_auth(&self.api_key);

        self.pacer.wait().await;
        if self.config.monitoring.request_logging {
            debug!("-> {} [{}]", endpoint, operation.operation_type());
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if self.config.monitoring.request_logging {
            debug!(
                "<- {} {} in {:.0}ms",
                endpoint,
                status.as_u16(),
                started.elapsed().as_secs_f64() * 1000.0
            );
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(StoreError::Rejected {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| StoreError::Malformed {
                endpoint,
                detail: e.to_string(),
            })
    }
}

/// Pull the `id` out of a creation response
fn extract_id(operation: &Operation, body: &Value) -> Result<String, StoreError> {
    body.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Malformed {
            endpoint: format!("{} {}", operation.http_method(), operation.path()),
            detail: "response has no 'id'".to_string(),
        })
}

/// Parse a `GET /bases/{baseId}/tables` body into a schema
fn parse_tables_response(operation: &Operation, body: Value) -> Result<SchemaDefinition, StoreError> {
    let response: TablesResponse =
        serde_json::from_value(body).map_err(|e| StoreError::Malformed {
            endpoint: format!("{} {}", operation.http_method(), operation.path()),
            detail: e.to_string(),
        })?;

    Ok(SchemaDefinition {
        name: None,
        workspace_id: None,
        tables: response.tables,
    })
}

#[async_trait]
impl SchemaStore for AirtableClient {
    async fn fetch_schema(&self, base_id: &str) -> Result<SchemaDefinition, StoreError> {
        let operation = Operation::fetch_schema(base_id);
        let body = self.execute(&operation).await?;
        parse_tables_response(&operation, body)
    }

    async fn create_base(&self, payload: &BasePayload) -> Result<String, StoreError> {
        let operation = Operation::create_base(payload.clone());
        let body = self.execute(&operation).await?;
        extract_id(&operation, &body)
    }

    async fn create_table(
        &self,
        base_id: &str,
        payload: &TablePayload,
    ) -> Result<String, StoreError> {
        let operation = Operation::create_table(base_id, payload.clone());
        let body = self.execute(&operation).await?;
        extract_id(&operation, &body)
    }

    async fn add_field(
        &self,
        base_id: &str,
        table_id: &str,
        payload: &FieldPayload,
    ) -> Result<String, StoreError> {
        let operation = Operation::add_field(base_id, table_id, payload.clone());
        let body = self.execute(&operation).await?;
        extract_id(&operation, &body)
    }
}
