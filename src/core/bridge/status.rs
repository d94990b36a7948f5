use std::sync::{Arc, Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Prefix marking a serial line as a status frame
pub const STATUS_PREFIX: &str = "STATUS:";

/// Reported when a serial send finds no open endpoint
pub const SERIAL_NOT_CONNECTED: &str = "Serial port not connected.";

/// Reported when a serial write on an open endpoint fails
pub const SERIAL_WRITE_FAILED: &str = "Error: Serial write failed.";

/// Reported once when the poll loop loses the serial connection
pub const SERIAL_CONNECTION_LOST: &str = "Error: Serial connection lost.";

/// Callback receiving every status message
pub type StatusObserver = Box<dyn FnMut(String) + Send + 'static>;

/// Extracts the status text from a serial line, if it is a status frame
pub fn parse_status_line(line: &str) -> Option<String> {
    line.trim()
        .strip_prefix(STATUS_PREFIX)
        .map(|rest| rest.trim().to_string())
}

/// Producer side of the status channel
#[derive(Debug, Clone)]
pub struct StatusSender {
    tx: mpsc::UnboundedSender<String>,
}

impl StatusSender {
    pub fn report(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("update_status -> {}", message);
        if self.tx.send(message).is_err() {
            warn!("Status dispatcher has stopped; status dropped");
        }
    }
}

/// Holds the single registered observer.
///
/// The dispatcher keeps the lock for the duration of a callback, so once
/// [`ObserverSlot::replace`] returns the previous observer is never called
/// again. Callbacks must not re-register from inside themselves.
#[derive(Clone, Default)]
pub struct ObserverSlot {
    inner: Arc<Mutex<Option<StatusObserver>>>,
}

impl ObserverSlot {
    /// Installs `observer`, dropping the previous one
    pub fn replace(&self, observer: Option<StatusObserver>) {
        *self.lock() = observer;
    }

    pub fn is_registered(&self) -> bool {
        self.lock().is_some()
    }

    fn deliver(&self, message: String) {
        let mut guard = self.lock();
        match guard.as_mut() {
            Some(observer) => observer(message),
            None => debug!("No status observer registered; dropping '{}'", message),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<StatusObserver>> {
        // a panicking observer must not take status delivery down with it
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}

/// Starts the single consumer that feeds the observer.
///
/// The task ends once every [`StatusSender`] clone has been dropped and the
/// queue is drained.
pub fn spawn_dispatcher(runtime: &Handle, slot: ObserverSlot) -> (StatusSender, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let handle = runtime.spawn(async move {
        while let Some(message) = rx.recv().await {
            slot.deliver(message);
        }
        debug!("Status dispatcher stopped");
    });

    (StatusSender { tx }, handle)
}
