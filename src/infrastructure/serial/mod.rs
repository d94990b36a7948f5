// Serial module - Line-oriented serial endpoint
pub mod endpoint;

pub use endpoint::{SerialEndpoint, SerialReader};
