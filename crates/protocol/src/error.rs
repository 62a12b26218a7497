//! Errors raised by a single request/response exchange.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The peer could not be reached
    #[error("Failed to connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the request or reading the response failed mid-exchange
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The peer closed the connection before sending a complete frame
    #[error("Connection closed before a response was received")]
    Closed,

    /// The outgoing payload could not be serialized
    #[error("Failed to encode payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The received frame is not a valid payload
    #[error("Failed to decode payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The exchange did not finish before its deadline
    #[error("Exchange timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;
