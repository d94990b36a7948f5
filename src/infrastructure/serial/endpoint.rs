use crate::domain::config::{FlowControlConfig, ParityConfig, SerialSettings};
use crate::domain::error::{QuadbotError, QuadbotResult};
use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Longest partial line kept while waiting for a terminator
pub const MAX_FRAME_LEN: usize = 4096;

const READ_CHUNK: usize = 256;

/// An open serial connection, split into a write half used on the caller's
/// context and a read half handed to the status poll loop.
///
/// Both halves share one liveness flag. Once it is cleared (by [`close`] or
/// by the reader after a fault) writes fail fast with
/// [`QuadbotError::DeviceNotConnected`].
///
/// [`close`]: SerialEndpoint::close
pub struct SerialEndpoint {
    port_name: String,
    writer: Mutex<Option<Box<dyn Write + Send>>>,
    reader: Option<SerialReader>,
    open: Arc<AtomicBool>,
}

impl SerialEndpoint {
    /// Opens and configures the port, then waits for the board to settle.
    ///
    /// Blocking; call from a blocking context.
    pub fn open(settings: &SerialSettings) -> QuadbotResult<Self> {
        let builder = serialport::new(&settings.port, settings.baud_rate)
            .data_bits(data_bits(settings.data_bits)?)
            .stop_bits(stop_bits(settings.stop_bits)?)
            .parity(match settings.parity {
                ParityConfig::None => serialport::Parity::None,
                ParityConfig::Even => serialport::Parity::Even,
                ParityConfig::Odd => serialport::Parity::Odd,
            })
            .flow_control(match settings.flow_control {
                FlowControlConfig::None => serialport::FlowControl::None,
                FlowControlConfig::Software => serialport::FlowControl::Software,
                FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
            })
            .timeout(Duration::from_millis(settings.read_timeout_ms));

        let port = builder.open().map_err(|e| QuadbotError::Connection {
            message: format!("Failed to open serial port {}: {}", settings.port, e),
        })?;
        let read_half = port.try_clone().map_err(|e| QuadbotError::Connection {
            message: format!("Failed to clone serial port {}: {}", settings.port, e),
        })?;

        info!(
            port = %settings.port,
            baud = settings.baud_rate,
            "Serial port opened"
        );

        if settings.settle_ms > 0 {
            debug!("Waiting {}ms for the board to settle", settings.settle_ms);
            std::thread::sleep(Duration::from_millis(settings.settle_ms));
        }

        Ok(Self::from_streams(settings.port.clone(), read_half, port))
    }

    /// Builds an endpoint over arbitrary byte streams
    pub fn from_streams<R, W>(port_name: impl Into<String>, reader: R, writer: W) -> Self
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let port_name = port_name.into();
        let open = Arc::new(AtomicBool::new(true));

        Self {
            reader: Some(SerialReader {
                port_name: port_name.clone(),
                source: Box::new(reader),
                pending: Vec::new(),
                open: Arc::clone(&open),
            }),
            writer: Mutex::new(Some(Box::new(writer))),
            port_name,
            open,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Hands out the read half. Only the first call gets it.
    pub fn take_reader(&mut self) -> Option<SerialReader> {
        self.reader.take()
    }

    /// Writes `text` followed by a single `\n`. Never retries.
    pub fn write_line(&self, text: &str) -> QuadbotResult<()> {
        if !self.is_open() {
            return Err(QuadbotError::DeviceNotConnected);
        }

        let mut guard = self
            .writer
            .lock()
            .map_err(|_| QuadbotError::transport("Serial writer lock poisoned"))?;
        let writer = guard.as_mut().ok_or(QuadbotError::DeviceNotConnected)?;

        let mut frame = Vec::with_capacity(text.len() + 1);
        frame.extend_from_slice(text.as_bytes());
        frame.push(b'\n');

        writer
            .write_all(&frame)
            .and_then(|_| writer.flush())
            .map_err(|e| {
                QuadbotError::transport(format!(
                    "Failed to write to serial port {}: {}",
                    self.port_name, e
                ))
            })?;

        debug!("Sent {} bytes over serial: {}", frame.len(), text);
        Ok(())
    }

    /// Closes the write half and clears the liveness flag.
    ///
    /// Returns `true` only for the call that actually released the handle.
    pub fn close(&self) -> bool {
        self.open.store(false, Ordering::SeqCst);

        let released = match self.writer.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if released.is_some() {
            info!("Serial connection {} closed", self.port_name);
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for SerialEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialEndpoint")
            .field("port_name", &self.port_name)
            .field("open", &self.is_open())
            .finish()
    }
}

/// Read half of a [`SerialEndpoint`], framing the inbound stream into lines
pub struct SerialReader {
    port_name: String,
    source: Box<dyn Read + Send>,
    pending: Vec<u8>,
    open: Arc<AtomicBool>,
}

impl SerialReader {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Clears the shared liveness flag after an unrecoverable read fault
    pub fn mark_lost(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    /// Returns one complete line if available, without blocking past the
    /// port's read timeout.
    ///
    /// Lines that fail to decode are logged and dropped; the call then
    /// reports no line. Only I/O faults other than timeouts are errors.
    pub fn read_available_line(&mut self) -> QuadbotResult<Option<String>> {
        if self.has_complete_line() {
            return Ok(self.next_line());
        }

        let mut chunk = [0u8; READ_CHUNK];
        match self.source.read(&mut chunk) {
            Ok(0) => {}
            Ok(n) => {
                trace!("Received {} bytes over serial", n);
                self.pending.extend_from_slice(&chunk[..n]);
            }
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
                ) => {}
            Err(e) => {
                return Err(QuadbotError::transport(format!(
                    "Failed to read from serial port {}: {}",
                    self.port_name, e
                )));
            }
        }

        if !self.has_complete_line() && self.pending.len() > MAX_FRAME_LEN {
            warn!(
                "Discarding {} bytes of unterminated serial input",
                self.pending.len()
            );
            self.pending.clear();
        }

        Ok(self.next_line())
    }

    fn has_complete_line(&self) -> bool {
        self.pending.contains(&b'\n')
    }

    fn next_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\n')?;
        let frame: Vec<u8> = self.pending.drain(..=end).collect();

        match decode_frame(frame) {
            Ok(line) => Some(line),
            Err(e) => {
                warn!("Dropping serial frame: {}", e);
                None
            }
        }
    }
}

/// Strips the line terminator and decodes the frame as UTF-8
fn decode_frame(mut frame: Vec<u8>) -> QuadbotResult<String> {
    while matches!(frame.last(), Some(b'\n') | Some(b'\r')) {
        frame.pop();
    }
    String::from_utf8(frame).map_err(|e| QuadbotError::ProtocolDecode(e.to_string()))
}

fn data_bits(bits: u8) -> QuadbotResult<serialport::DataBits> {
    match bits {
        5 => Ok(serialport::DataBits::Five),
        6 => Ok(serialport::DataBits::Six),
        7 => Ok(serialport::DataBits::Seven),
        8 => Ok(serialport::DataBits::Eight),
        _ => Err(QuadbotError::config(format!("Invalid data bits: {}", bits))),
    }
}

fn stop_bits(bits: u8) -> QuadbotResult<serialport::StopBits> {
    match bits {
        1 => Ok(serialport::StopBits::One),
        2 => Ok(serialport::StopBits::Two),
        _ => Err(QuadbotError::config(format!("Invalid stop bits: {}", bits))),
    }
}
