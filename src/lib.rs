//! Quadbot Library
//!
//! Command bridge for a four-limbed crawling robot: commands go out over a
//! serial link or as HTTP requests, and status lines come back through a
//! single observer.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::bridge::{BridgeOptions, BridgeState, CommandBridge};
pub use crate::core::transport::{HttpOutcome, HttpTransport, Transport};
pub use domain::command::RobotCommand;
pub use domain::config::{QuadbotConfig, TransportMode};
pub use domain::error::{QuadbotError, QuadbotResult};
