use crate::core::bridge::status::{parse_status_line, StatusSender, SERIAL_CONNECTION_LOST};
use crate::infrastructure::serial::SerialReader;
use std::time::Duration;
use tracing::{debug, error, info};

/// Why the poll loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    /// The endpoint was closed on purpose
    Closed,
    /// A transport fault ended the connection
    Lost,
}

/// Drains the serial read half for `STATUS:` frames.
///
/// Runs on a blocking thread for as long as the endpoint stays open.
pub struct StatusPoller {
    reader: SerialReader,
    status: StatusSender,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(reader: SerialReader, status: StatusSender, interval: Duration) -> Self {
        Self {
            reader,
            status,
            interval,
        }
    }

    pub fn run(mut self) -> PollExit {
        info!("Serial status poll loop started");

        loop {
            if !self.reader.is_open() {
                info!("Serial endpoint closed; poll loop exiting");
                return PollExit::Closed;
            }

            match self.reader.read_available_line() {
                Ok(Some(line)) => {
                    self.handle_line(&line);
                    // drain buffered lines before sleeping
                    continue;
                }
                Ok(None) => {}
                Err(e) => {
                    if !self.reader.is_open() {
                        info!("Serial endpoint closed during read; poll loop exiting");
                        return PollExit::Closed;
                    }
                    error!("Serial connection lost: {}", e);
                    self.reader.mark_lost();
                    self.status.report(SERIAL_CONNECTION_LOST);
                    return PollExit::Lost;
                }
            }

            std::thread::sleep(self.interval);
        }
    }

    fn handle_line(&self, line: &str) {
        debug!("Received from serial: {}", line);
        if let Some(message) = parse_status_line(line) {
            self.status.report(message);
        }
    }
}
