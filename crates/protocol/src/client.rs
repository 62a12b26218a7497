//! Client side of the one-shot exchanges.
//!
//! Every exchange opens its own connection, writes one request frame, reads
//! one response frame and closes the connection. A feed watch is the one
//! exception: it keeps reading frames until the master hangs up.

use crate::error::{ExchangeError, Result};
use crate::framing::{read_frame, write_frame};
use crate::messages::{FeedRequest, RecommendationRequest};
use data_loader::{AggregatedResult, Partition, PredictedResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, info};

/// Send `request` to `addr` and wait for a single response frame
pub async fn round_trip<Req, Resp>(addr: &str, request: &Req) -> Result<Resp>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let (mut reader, _writer) = open_exchange(addr, request).await?;
    debug!("Request sent to {}, waiting for response", addr);
    read_frame(&mut reader).await
}

/// Connect and send the request frame, leaving the stream open for responses
async fn open_exchange<Req>(
    addr: &str,
    request: &Req,
) -> Result<(BufReader<OwnedReadHalf>, OwnedWriteHalf)>
where
    Req: Serialize + ?Sized,
{
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ExchangeError::Connection {
            addr: addr.to_string(),
            source,
        })?;

    let (reader, mut writer) = stream.into_split();
    write_frame(&mut writer, request).await?;
    Ok((BufReader::new(reader), writer))
}

/// Talks to one worker process
#[derive(Debug, Clone)]
pub struct WorkerClient {
    addr: String,
}

impl WorkerClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Ship a partition to the worker and decode its predictions
    pub async fn score_partition(&self, partition: &Partition) -> Result<Vec<PredictedResult>> {
        debug!(
            "Sending partition with {} reviewers to {}",
            partition.len(),
            self.addr
        );
        let results: Vec<PredictedResult> = round_trip(&self.addr, partition).await?;
        info!("Received {} results from {}", results.len(), self.addr);
        Ok(results)
    }

    /// Address of the worker this client talks to
    pub fn address(&self) -> &str {
        &self.addr
    }
}

/// Talks to the master request service
#[derive(Debug, Clone)]
pub struct MasterClient {
    addr: String,
}

impl MasterClient {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<Vec<AggregatedResult>> {
        round_trip(&self.addr, request).await
    }

    /// The most recently published result set; empty before the first request
    pub async fn latest(&self) -> Result<Vec<AggregatedResult>> {
        round_trip(&self.addr, &FeedRequest::latest()).await
    }

    /// Subscribe to every result set the master publishes from now on
    pub async fn watch(&self) -> Result<FeedWatch> {
        let (reader, writer) = open_exchange(&self.addr, &FeedRequest::watch()).await?;
        info!("Watching recommendation feed on {}", self.addr);
        Ok(FeedWatch {
            reader,
            _writer: writer,
        })
    }

    pub fn address(&self) -> &str {
        &self.addr
    }
}

/// An open `watch` connection to the master
pub struct FeedWatch {
    reader: BufReader<OwnedReadHalf>,
    // Dropping the write half would half-close the connection
    _writer: OwnedWriteHalf,
}

impl FeedWatch {
    /// Wait for the next published result set.
    ///
    /// Returns [`ExchangeError::Closed`] once the master ends the stream.
    pub async fn next(&mut self) -> Result<Vec<AggregatedResult>> {
        read_frame(&mut self.reader).await
    }
}
