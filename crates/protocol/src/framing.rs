//! Newline-delimited JSON framing.
//!
//! Each message is one JSON document on one line. serde_json escapes control
//! characters inside strings, so an encoded document never contains a raw
//! `\n` and the newline is an unambiguous terminator.

use crate::error::{ExchangeError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Serialize `message` and write it as a single terminated line
pub async fn write_frame<W, T>(writer: &mut W, message: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(message).map_err(ExchangeError::Encode)?;
    line.push(b'\n');
    writer.write_all(&line).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one line and decode it.
///
/// Reaching end of stream before any byte arrives yields [`ExchangeError::Closed`].
pub async fn read_frame<R, T>(reader: &mut R) -> Result<T>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line).await?;
    if read == 0 {
        return Err(ExchangeError::Closed);
    }
    decode(&line)
}

/// Decode a single frame, ignoring surrounding whitespace and the terminator
pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T> {
    serde_json::from_str(line.trim()).map_err(ExchangeError::Decode)
}
