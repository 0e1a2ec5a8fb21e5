//! Outbound HTTP call executor.
//!
//! The node's `data` payload configures the request:
//!
//! ```json
//! {
//!   "url": "https://api.example.com/items",
//!   "method": "POST",
//!   "headers": {"x-api-key": "..."},
//!   "body": {"name": "new item"},
//!   "output_key": "createItem"
//! }
//! ```
//!
//! Only `url` is required. The response is recorded in the context under
//! `output_key` (default `httpRequest`) as `{"status": ..., "body": ...}`,
//! with the body parsed as JSON when possible and kept as a string otherwise.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Executor, ExecutorError, ExecutorInput};
use crate::context::ExecutionContext;
use crate::events::NodeEmitter;

const DEFAULT_OUTPUT_KEY: &str = "httpRequest";

#[derive(Debug, Deserialize)]
struct HttpRequestConfig {
    url: String,
    #[serde(default = "default_method")]
    method: String,
    #[serde(default)]
    headers: Option<rustc_hash::FxHashMap<String, String>>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    output_key: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Issues an HTTP call configured by the node's data payload.
#[derive(Debug, Default)]
pub struct HttpRequestExecutor {
    client: reqwest::Client,
}

impl HttpRequestExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured client (timeouts, proxies, TLS settings).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn execute(&self, config: &HttpRequestConfig) -> Result<Value, ExecutorError> {
        let method = reqwest::Method::from_bytes(config.method.to_uppercase().as_bytes())
            .map_err(|_| {
                ExecutorError::InvalidConfig(format!("unknown HTTP method '{}'", config.method))
            })?;

        let mut request = self.client.request(method, &config.url);
        if let Some(headers) = &config.headers {
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }
        if let Some(body) = &config.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ExecutorError::Provider {
            provider: "http",
            message: e.to_string(),
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ExecutorError::Provider {
            provider: "http",
            message: e.to_string(),
        })?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        Ok(json!({"status": status, "body": body}))
    }
}

#[async_trait]
impl Executor for HttpRequestExecutor {
    async fn run(
        &self,
        input: &ExecutorInput,
        context: ExecutionContext,
        emitter: &NodeEmitter,
    ) -> Result<ExecutionContext, ExecutorError> {
        emitter.loading().await?;

        // A bad payload still surfaces on the status channel, like any other
        // node failure.
        let config: HttpRequestConfig = match serde_json::from_value(input.data.clone()) {
            Ok(config) => config,
            Err(e) => {
                let err = ExecutorError::InvalidConfig(e.to_string());
                emitter.error(err.to_string()).await?;
                return Err(err);
            }
        };
        let output_key = config
            .output_key
            .clone()
            .unwrap_or_else(|| DEFAULT_OUTPUT_KEY.to_string());

        tracing::debug!(
            node_id = %input.node_id,
            url = %config.url,
            method = %config.method,
            "dispatching http request"
        );

        match self.execute(&config).await {
            Ok(result) => {
                emitter.success(Some(result.clone())).await?;
                Ok(context.with_entry(output_key, result))
            }
            Err(err) => {
                emitter.error(err.to_string()).await?;
                Err(err)
            }
        }
    }
}
