use crate::core::bridge::poll::{PollExit, StatusPoller};
use crate::core::bridge::status::{
    spawn_dispatcher, ObserverSlot, StatusSender, SERIAL_NOT_CONNECTED, SERIAL_WRITE_FAILED,
};
use crate::core::transport::{HttpTransport, Transport};
use crate::domain::config::{GlobalConfig, QuadbotConfig, TransportMode};
use crate::domain::error::{QuadbotError, QuadbotResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};

/// Whether anyone is listening for status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Active,
}

/// Tuning knobs for a [`CommandBridge`]
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    pub poll_interval: Duration,
    pub max_in_flight: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self::from(&GlobalConfig::default())
    }
}

impl From<&GlobalConfig> for BridgeOptions {
    fn from(global: &GlobalConfig) -> Self {
        Self {
            poll_interval: global.poll_interval(),
            max_in_flight: global.max_in_flight.max(1),
        }
    }
}

/// Routes commands to the robot and funnels every status back through one
/// observer.
///
/// `send_command` never blocks on the network and never returns an error:
/// failures arrive at the observer as plain status text.
pub struct CommandBridge {
    transport: Transport,
    observer: ObserverSlot,
    status: Option<StatusSender>,
    runtime: Handle,
    in_flight: Arc<Semaphore>,
    poll: Option<JoinHandle<PollExit>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl CommandBridge {
    /// Takes ownership of `transport` and starts the status machinery.
    ///
    /// Must be called inside a tokio runtime. In serial mode with an open
    /// endpoint the poll loop starts immediately.
    pub fn new(mut transport: Transport, options: BridgeOptions) -> QuadbotResult<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            QuadbotError::Runtime(format!("Command bridge needs a tokio runtime: {}", e))
        })?;

        let observer = ObserverSlot::default();
        let (status, dispatcher) = spawn_dispatcher(&runtime, observer.clone());

        let poll = match &mut transport {
            Transport::Serial(Some(endpoint)) => endpoint.take_reader().map(|reader| {
                let poller = StatusPoller::new(reader, status.clone(), options.poll_interval);
                runtime.spawn_blocking(move || poller.run())
            }),
            Transport::Serial(None) => {
                warn!("Serial port unavailable; commands will report not connected");
                None
            }
            Transport::Wireless(_) => None,
        };

        info!("Command bridge started in {} mode", transport.mode());

        Ok(Self {
            transport,
            observer,
            status: Some(status),
            runtime,
            in_flight: Arc::new(Semaphore::new(options.max_in_flight.max(1))),
            poll,
            dispatcher: Some(dispatcher),
        })
    }

    /// Opens the configured transport and builds a bridge over it
    pub async fn connect(config: &QuadbotConfig) -> QuadbotResult<Self> {
        let transport = Transport::open(&config.link).await?;
        Self::new(transport, BridgeOptions::from(&config.global))
    }

    pub fn mode(&self) -> TransportMode {
        self.transport.mode()
    }

    pub fn state(&self) -> BridgeState {
        if self.observer.is_registered() {
            BridgeState::Active
        } else {
            BridgeState::Idle
        }
    }

    /// True while a serial endpoint is open; always false in wireless mode
    pub fn is_serial_connected(&self) -> bool {
        self.transport.is_serial_connected()
    }

    /// Whether the status poll loop is still running
    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Replaces any existing observer. After this returns the previous
    /// observer receives nothing further.
    pub fn register_status_observer<F>(&self, observer: F)
    where
        F: FnMut(String) + Send + 'static,
    {
        self.observer.replace(Some(Box::new(observer)));
        debug!("Status observer registered");
    }

    pub fn clear_status_observer(&self) {
        self.observer.replace(None);
        debug!("Status observer cleared");
    }

    /// Sends `command` verbatim over the active transport
    pub fn send_command(&self, command: impl AsRef<str>) {
        let command = command.as_ref();
        info!("send_command: {}", command);

        match &self.transport {
            Transport::Serial(endpoint) => {
                let result = match endpoint {
                    Some(endpoint) => endpoint.write_line(command),
                    None => Err(QuadbotError::DeviceNotConnected),
                };

                match result {
                    Ok(()) => {}
                    Err(QuadbotError::DeviceNotConnected) => {
                        warn!("Serial port not connected; '{}' not sent", command);
                        self.report(SERIAL_NOT_CONNECTED);
                    }
                    Err(e) => {
                        warn!("Serial send of '{}' failed: {}", command, e);
                        self.report(SERIAL_WRITE_FAILED);
                    }
                }
            }
            Transport::Wireless(http) => self.dispatch_http(Arc::clone(http), command),
        }
    }

    fn dispatch_http(&self, http: Arc<dyn HttpTransport>, command: &str) {
        let Some(status) = self.status.clone() else {
            warn!("Bridge is shut down; '{}' not sent", command);
            return;
        };

        let permits = Arc::clone(&self.in_flight);
        let command = command.to_string();
        let span = info_span!(
            "http_command",
            id = %uuid::Uuid::new_v4().simple(),
            command = %command
        );

        self.runtime.spawn(
            async move {
                // the semaphore is never closed, so a permit always arrives
                let _permit = permits.acquire_owned().await.ok();
                let outcome = http.get(&command).await;
                debug!("HTTP outcome: {}", outcome);
                status.report(outcome.status_message());
            }
            .instrument(span),
        );
    }

    fn report(&self, message: &str) {
        match &self.status {
            Some(status) => status.report(message),
            None => warn!("Bridge is shut down; status '{}' dropped", message),
        }
    }

    fn close_endpoint(&self) -> bool {
        match &self.transport {
            Transport::Serial(Some(endpoint)) => endpoint.close(),
            _ => false,
        }
    }

    /// Closes the serial endpoint, waits for the poll loop to exit and lets
    /// queued statuses reach the observer. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        self.close_endpoint();

        if let Some(poll) = self.poll.take() {
            match poll.await {
                Ok(exit) => debug!("Poll loop finished: {:?}", exit),
                Err(e) => warn!("Poll loop task failed: {}", e),
            }
        }

        // in-flight HTTP tasks keep their own sender until they report
        self.status.take();

        if let Some(dispatcher) = self.dispatcher.take() {
            if let Err(e) = dispatcher.await {
                warn!("Status dispatcher task failed: {}", e);
            }
        }

        info!("Command bridge stopped");
    }
}

impl Drop for CommandBridge {
    fn drop(&mut self) {
        if self.close_endpoint() {
            debug!("Command bridge dropped without shutdown; serial endpoint closed");
        }
    }
}

impl std::fmt::Debug for CommandBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBridge")
            .field("transport", &self.transport)
            .field("state", &self.state())
            .field("polling", &self.is_polling())
            .finish()
    }
}
