use crate::domain::config::{LinkConfig, TransportMode};
use crate::domain::error::QuadbotResult;
use crate::infrastructure::http::HttpCommandClient;
use crate::infrastructure::serial::SerialEndpoint;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// Result of a single HTTP command request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpOutcome {
    /// The robot answered with this status code
    Success(u16),
    Timeout,
    ConnectionFailed,
    OtherError(String),
}

impl HttpOutcome {
    /// Operator-facing text for this outcome
    pub fn status_message(&self) -> String {
        match self {
            HttpOutcome::Success(200) => "Command Sent Successfully (HTTP)".to_string(),
            HttpOutcome::Success(code) => format!("Error: HTTP {}", code),
            HttpOutcome::Timeout => "Error: HTTP Request Timed Out".to_string(),
            HttpOutcome::ConnectionFailed => "Error: Connection Failed".to_string(),
            HttpOutcome::OtherError(detail) => format!("Error: {}", detail),
        }
    }
}

impl fmt::Display for HttpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpOutcome::Success(code) => write!(f, "HTTP {}", code),
            HttpOutcome::Timeout => write!(f, "timeout"),
            HttpOutcome::ConnectionFailed => write!(f, "connection failed"),
            HttpOutcome::OtherError(detail) => write!(f, "error: {}", detail),
        }
    }
}

/// One-shot request channel used in wireless mode
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues `GET /<path>`. Never retries.
    async fn get(&self, path: &str) -> HttpOutcome;

    /// Where requests go, for logging
    fn endpoint(&self) -> String;
}

/// The single channel selected at startup
pub enum Transport {
    /// `None` when the port could not be opened; sends then fail fast
    Serial(Option<SerialEndpoint>),
    Wireless(Arc<dyn HttpTransport>),
}

impl Transport {
    /// Builds the transport for the configured mode.
    ///
    /// A serial port that cannot be opened is logged and yields a
    /// disconnected serial transport rather than an error.
    pub async fn open(link: &LinkConfig) -> QuadbotResult<Self> {
        match link.mode {
            TransportMode::Serial => {
                let settings = link.serial.clone();
                let opened =
                    tokio::task::spawn_blocking(move || SerialEndpoint::open(&settings)).await;

                match opened {
                    Ok(Ok(endpoint)) => Ok(Transport::Serial(Some(endpoint))),
                    Ok(Err(e)) => {
                        error!("{}", e);
                        Ok(Transport::Serial(None))
                    }
                    Err(e) => {
                        error!("Serial open task failed: {}", e);
                        Ok(Transport::Serial(None))
                    }
                }
            }
            TransportMode::Wireless => {
                let client = HttpCommandClient::new(&link.wireless)?;
                info!("Wireless transport targeting {}", client.endpoint());
                Ok(Transport::Wireless(Arc::new(client)))
            }
        }
    }

    pub fn mode(&self) -> TransportMode {
        match self {
            Transport::Serial(_) => TransportMode::Serial,
            Transport::Wireless(_) => TransportMode::Wireless,
        }
    }

    /// Whether a serial endpoint is present and open; always false for HTTP
    pub fn is_serial_connected(&self) -> bool {
        matches!(self, Transport::Serial(Some(endpoint)) if endpoint.is_open())
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Serial(endpoint) => f.debug_tuple("Serial").field(endpoint).finish(),
            Transport::Wireless(http) => f.debug_tuple("Wireless").field(&http.endpoint()).finish(),
        }
    }
}
