use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::query::models::{
    DEFAULT_LIMIT, ExecutionRequest, ExecutionResult, GenerationRequest, GenerationResult,
};
use crate::web::handlers::api::DatabaseList;

// Applied to every call into the API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum ClientError {
    Transport(String),
    Api { status: StatusCode, detail: String },
    Generation(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "Could not reach the API: {}", msg),
            ClientError::Api { status, detail } => write!(f, "API returned {}: {}", status, detail),
            ClientError::Generation(msg) => write!(f, "SQL generation failed: {}", msg),
        }
    }
}

impl Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

/// Thin client for the text-to-SQL HTTP API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Embedded generation errors come back as `ClientError::Generation`.
    pub async fn text_to_sql(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        let response = self
            .http
            .post(self.url("/api/text-to-sql"))
            .json(request)
            .send()
            .await?;
        let result: GenerationResult = read_json(response).await?;

        if !result.is_success() {
            return Err(ClientError::Generation(
                result.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        Ok(result)
    }

    pub async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, ClientError> {
        let response = self
            .http
            .post(self.url("/api/execute"))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn databases(&self) -> Result<Vec<String>, ClientError> {
        let response = self.http.get(self.url("/api/databases")).send().await?;
        let list: DatabaseList = read_json(response).await?;
        Ok(list.databases)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    debug!("API error body: {}", text);
    let detail = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(text);

    Err(ClientError::Api { status, detail })
}

/// Generates SQL for a question and prints it, optionally followed by the
/// simulated execution result.
pub async fn ask(
    client: &ApiClient,
    request: GenerationRequest,
    execute: bool,
) -> Result<(), ClientError> {
    let generated = match client.text_to_sql(&request).await {
        Ok(generated) => generated,
        Err(e) => {
            if let Ok(databases) = client.databases().await {
                if !databases.contains(&request.database) {
                    warn!("Available databases: {}", databases.join(", "));
                }
            }
            return Err(e);
        }
    };

    println!("Generated SQL:\n{}\n", generated.sql);
    println!("Explanation: {}", generated.explanation);
    println!("Confidence: {:.2}", generated.confidence);

    if execute {
        let result = client
            .execute(&ExecutionRequest {
                sql: generated.sql,
                database: generated.database,
                limit: DEFAULT_LIMIT,
            })
            .await?;
        let pretty = serde_json::to_string_pretty(&result)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        println!("\nExecution result:\n{}", pretty);
    }

    Ok(())
}
