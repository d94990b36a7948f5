// Bridge module - Command dispatch, status poll loop and observer plumbing
pub mod bridge;
pub mod poll;
pub mod status;

pub use bridge::{BridgeOptions, BridgeState, CommandBridge};
pub use poll::{PollExit, StatusPoller};
pub use status::{
    parse_status_line, ObserverSlot, StatusObserver, StatusSender, SERIAL_CONNECTION_LOST,
    SERIAL_NOT_CONNECTED, SERIAL_WRITE_FAILED, STATUS_PREFIX,
};
