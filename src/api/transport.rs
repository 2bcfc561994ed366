use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::Settings;
use crate::{DubdeskError, Result};

/// JSON request/response transport against the dashboard API.
///
/// Paths are relative to the API root, e.g. `api/projects`.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get(&self, path: &str) -> Result<Value>;

    async fn post(&self, path: &str, body: Value) -> Result<Value>;
}

/// Issue a GET and decode the body into `T`.
pub async fn get_json<T>(transport: &dyn ApiTransport, path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = transport.get(path).await?;
    Ok(serde_json::from_value(value)?)
}

/// Serialize `body`, issue a POST and decode the response into `T`.
pub async fn post_json<B, T>(transport: &dyn ApiTransport, path: &str, body: &B) -> Result<T>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let body = serde_json::to_value(body)?;
    let value = transport.post(path, body).await?;
    Ok(serde_json::from_value(value)?)
}

/// reqwest-backed transport.
pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base_url = Url::parse(&base)
            .map_err(|e| DubdeskError::Config(format!("Invalid API base URL '{}': {}", base, e)))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(&settings.api.base_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| DubdeskError::Config(format!("Invalid request path '{}': {}", path, e)))
    }

    async fn read_body(path: &str, response: Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, path, "API returned an error status");
            return Err(DubdeskError::Status {
                status: status.as_u16(),
                path: path.to_string(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.request_url(path)?;
        tracing::debug!(method = "GET", %url, "API request");

        let response = self.http.get(url).send().await?;
        Self::read_body(path, response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = self.request_url(path)?;
        tracing::debug!(method = "POST", %url, "API request");

        let response = self.http.post(url).json(&body).send().await?;
        Self::read_body(path, response).await
    }
}
