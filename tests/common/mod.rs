//! Shared doubles for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use quadbot::{CommandBridge, HttpOutcome, HttpTransport};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc as std_mpsc, Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

/// One scripted result for [`ScriptedReader`]
pub enum Step {
    Data(Vec<u8>),
    Fail(io::ErrorKind),
}

/// Serial read half fed from a channel. An empty channel reads as a
/// timeout, the same way a quiet port does.
pub struct ScriptedReader {
    steps: std_mpsc::Receiver<Step>,
    reads: Arc<AtomicUsize>,
}

/// Test side of a [`ScriptedReader`]
#[derive(Clone)]
pub struct Script {
    steps: std_mpsc::Sender<Step>,
    reads: Arc<AtomicUsize>,
}

impl Script {
    pub fn push(&self, bytes: impl Into<Vec<u8>>) {
        let _ = self.steps.send(Step::Data(bytes.into()));
    }

    pub fn fail(&self, kind: io::ErrorKind) {
        let _ = self.steps.send(Step::Fail(kind));
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

pub fn scripted_reader() -> (ScriptedReader, Script) {
    let (tx, rx) = std_mpsc::channel();
    let reads = Arc::new(AtomicUsize::new(0));
    (
        ScriptedReader {
            steps: rx,
            reads: Arc::clone(&reads),
        },
        Script { steps: tx, reads },
    )
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match self.steps.try_recv() {
            Ok(Step::Data(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            Ok(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted fault")),
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "no data")),
        }
    }
}

/// Write half that records everything written to it
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Write half whose every write fails
pub struct FailingSink;

impl Write for FailingSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
    }
}

/// HTTP transport that answers every request with a fixed outcome
pub struct MockHttp {
    outcome: HttpOutcome,
    delay: Duration,
    paths: Mutex<Vec<String>>,
}

impl MockHttp {
    pub fn new(outcome: HttpOutcome) -> Self {
        Self::delayed(outcome, Duration::ZERO)
    }

    pub fn delayed(outcome: HttpOutcome, delay: Duration) -> Self {
        Self {
            outcome,
            delay,
            paths: Mutex::new(Vec::new()),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockHttp {
    async fn get(&self, path: &str) -> HttpOutcome {
        self.paths.lock().unwrap().push(path.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome.clone()
    }

    fn endpoint(&self) -> String {
        "http://mock".to_string()
    }
}

/// Registers an observer that forwards every status into a channel
pub fn collect_statuses(bridge: &CommandBridge) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    bridge.register_status_observer(move |message| {
        let _ = tx.send(message);
    });
    rx
}

/// Next status, or `None` if nothing arrives within a second
pub async fn next_status(rx: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .ok()
        .flatten()
}
