use crate::cli::args::OutputFormat;
use crate::domain::config::QuadbotConfig;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_status(&self, message: &str) -> Result<(), OutputError>;
    fn write_config(&self, config: &QuadbotConfig) -> Result<(), OutputError>;
    fn write_paths(&self, global: &Path, project: Option<&Path>) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::QuadbotError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// One robot status line as emitted in JSON mode
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecord<'a> {
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
    pub message: &'a str,
}

impl<'a> StatusRecord<'a> {
    pub fn now(message: &'a str) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        Self { timestamp, message }
    }
}

#[derive(Serialize)]
struct ConfigPaths<'a> {
    global: &'a Path,
    project: Option<&'a Path>,
}

/// Console output writer
#[derive(Debug, Clone, Copy)]
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Renders a status line without printing it
    pub fn render_status(&self, message: &str) -> Result<String, OutputError> {
        match self.format {
            OutputFormat::Text => Ok(message.to_string()),
            OutputFormat::Json => Ok(serde_json::to_string(&StatusRecord::now(message))?),
        }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_status(&self, message: &str) -> Result<(), OutputError> {
        println!("{}", self.render_status(message)?);
        Ok(())
    }

    fn write_config(&self, config: &QuadbotConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("Quadbot Configuration:");
                println!("  Log level: {}", config.global.log_level);
                println!("  Poll interval: {}ms", config.global.poll_interval_ms);
                println!("  Max in-flight HTTP commands: {}", config.global.max_in_flight);
                println!("  Mode: {}", config.link.mode);
                println!("  Serial:");
                println!("    Port: {}", config.link.serial.port);
                println!("    Baud rate: {}", config.link.serial.baud_rate);
                println!("    Read timeout: {}ms", config.link.serial.read_timeout_ms);
                println!("    Settle delay: {}ms", config.link.serial.settle_ms);
                println!("  Wireless:");
                println!("    Endpoint: {}", config.link.wireless.base_url());
                println!("    Timeout: {}ms", config.link.wireless.timeout_ms);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
        }
        Ok(())
    }

    fn write_paths(&self, global: &Path, project: Option<&Path>) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("Global config: {}", global.display());
                match project {
                    Some(path) => println!("Project config: {}", path.display()),
                    None => println!("Project config: (none)"),
                }
            }
            OutputFormat::Json => {
                let paths = ConfigPaths { global, project };
                println!("{}", serde_json::to_string_pretty(&paths)?);
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                let output = serde_json::json!({ "message": message });
                println!("{}", output);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", error),
            OutputFormat::Json => {
                let output = serde_json::json!({ "error": error });
                eprintln!("{}", output);
            }
        }
        Ok(())
    }
}
