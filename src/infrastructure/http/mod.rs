// HTTP module - One-shot command requests for wireless mode
pub mod client;

pub use client::HttpCommandClient;
