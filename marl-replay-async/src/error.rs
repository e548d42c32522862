//! Errors in the library.
use thiserror::Error;

/// Errors in the communication with the store server.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AsyncReplayError {
    /// The channel of pushed items is full or closed.
    #[error("Failed to send message for pushing transitions")]
    SendMsgForPush,

    /// The server thread is no longer running.
    #[error("Store server is disconnected")]
    Disconnected,

    /// The channel of pushed items was configured with zero capacity.
    #[error("Channel capacity of the store server must be positive")]
    InvalidChannelCapacity,

    /// The server thread panicked.
    #[error("Store server thread panicked")]
    ServerPanicked,
}
