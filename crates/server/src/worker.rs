//! Worker process: receives a partition, scores it, answers with predictions.
//!
//! Each connection carries exactly one exchange. A connection whose request
//! cannot be read or decoded is closed without a response.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use data_loader::{Partition, PredictedResult};
use engine::WorkerEngine;
use protocol::{read_frame, write_frame};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info};

/// Pause before accepting again after a failed accept (e.g. EMFILE)
pub(crate) const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

pub struct WorkerServer {
    listener: TcpListener,
    engine: WorkerEngine,
}

impl WorkerServer {
    /// Bind the worker's listening socket
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind worker listener")?;
        Ok(Self {
            listener,
            engine: WorkerEngine::new(),
        })
    }

    pub fn with_engine(mut self, engine: WorkerEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Worker listener has no local address")
    }

    /// Accept connections forever, one task per connection
    pub async fn serve(self) -> Result<()> {
        info!("Worker listening on {}", self.local_addr()?);
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            info!("Connection from master {}", peer);
            let engine = self.engine;
            tokio::spawn(async move {
                let (reader, writer) = stream.into_split();
                if let Err(e) = handle_exchange(reader, writer, engine).await {
                    error!("Exchange with {} failed: {:#}", peer, e);
                }
            });
        }
    }
}

/// Serve one request/response exchange over any byte stream
pub async fn handle_exchange<R, W>(reader: R, mut writer: W, engine: WorkerEngine) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let partition: Partition = read_frame(&mut reader)
        .await
        .context("Failed to receive partition")?;
    info!("Received partition with {} reviewers", partition.len());

    // CPU-bound, keep it off the async workers
    let results: Vec<PredictedResult> = tokio::task::spawn_blocking(move || engine.run(&partition))
        .await
        .context("Scoring task panicked")?;

    write_frame(&mut writer, &results)
        .await
        .context("Failed to send results")?;
    info!("Sent {} results to master", results.len());
    Ok(())
}
