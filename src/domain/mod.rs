// Domain module - Configuration, command vocabulary and error types
pub mod command;
pub mod config;
pub mod error;
