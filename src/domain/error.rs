use thiserror::Error;

/// Quadbot unified error type
#[derive(Error, Debug)]
pub enum QuadbotError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Device not connected")]
    DeviceNotConnected,

    #[error("Request timed out")]
    Timeout,

    #[error("Protocol decode error: {0}")]
    ProtocolDecode(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type QuadbotResult<T> = Result<T, QuadbotError>;

impl QuadbotError {
    /// Shorthand for a transport failure on an open endpoint
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
