//! Wire protocol shared by the master, the workers and their clients.
//!
//! This crate handles:
//! - Newline-delimited JSON framing over a TCP stream
//! - One-shot exchanges: connect, send one frame, read one frame, close
//! - Feed watches: one request frame, then a frame per published result set
//! - Classifying exchange failures (connection, transport, decode, timeout)
//!
//! There is no version field, no authentication and no compression.

pub mod client;
pub mod error;
pub mod framing;
pub mod messages;

pub use client::{FeedWatch, MasterClient, WorkerClient, round_trip};
pub use error::{ExchangeError, Result};
pub use framing::{decode, read_frame, write_frame};
pub use messages::{FeedMode, FeedRequest, MasterRequest, RecommendationRequest};
