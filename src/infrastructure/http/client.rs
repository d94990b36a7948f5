use crate::core::transport::{HttpOutcome, HttpTransport};
use crate::domain::config::WirelessSettings;
use crate::domain::error::{QuadbotError, QuadbotResult};
use async_trait::async_trait;
use tracing::debug;

/// HTTP command client; each command is an independent `GET /<command>`
#[derive(Debug, Clone)]
pub struct HttpCommandClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCommandClient {
    pub fn new(settings: &WirelessSettings) -> QuadbotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| QuadbotError::Connection {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: settings.base_url(),
        })
    }

    /// The command is embedded in the path as-is; the vocabulary is path-safe
    pub fn url_for(&self, command: &str) -> String {
        format!("{}/{}", self.base_url, command)
    }
}

#[async_trait]
impl HttpTransport for HttpCommandClient {
    async fn get(&self, path: &str) -> HttpOutcome {
        let url = self.url_for(path);
        debug!("HTTP GET -> {}", url);

        match self.client.get(&url).send().await {
            Ok(response) => HttpOutcome::Success(response.status().as_u16()),
            Err(e) if e.is_timeout() => HttpOutcome::Timeout,
            Err(e) if e.is_connect() => HttpOutcome::ConnectionFailed,
            Err(e) => HttpOutcome::OtherError(e.to_string()),
        }
    }

    fn endpoint(&self) -> String {
        self.base_url.clone()
    }
}
