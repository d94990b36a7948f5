// Core module - Transport layer and command bridge
pub mod bridge;
pub mod transport;

pub use bridge::{BridgeOptions, BridgeState, CommandBridge};
pub use transport::{HttpOutcome, HttpTransport, Transport};
