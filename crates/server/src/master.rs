//! Master request service.
//!
//! Clients send one `RecommendationRequest` per connection and receive the
//! ranked result array. Every answered request is also published to the
//! shared [`RecommendationFeed`], which clients read with a `latest` request
//! or follow with a `watch` connection.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use protocol::{FeedMode, FeedRequest, MasterRequest, RecommendationRequest, read_frame, write_frame};
use tokio::io::BufReader;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::feed::RecommendationFeed;
use crate::orchestrator::RecommendationOrchestrator;
use crate::worker::ACCEPT_RETRY_DELAY;

pub struct MasterServer {
    listener: TcpListener,
    orchestrator: RecommendationOrchestrator,
    feed: RecommendationFeed,
}

impl MasterServer {
    pub async fn bind(
        addr: impl ToSocketAddrs,
        orchestrator: RecommendationOrchestrator,
        feed: RecommendationFeed,
    ) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .context("Failed to bind master listener")?;
        Ok(Self {
            listener,
            orchestrator,
            feed,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Master listener has no local address")
    }

    pub async fn serve(self) -> Result<()> {
        info!(
            "Master listening on {} with {} configured workers",
            self.local_addr()?,
            self.orchestrator.workers().len()
        );
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            let orchestrator = self.orchestrator.clone();
            let feed = self.feed.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_request(stream, &orchestrator, &feed).await {
                    // Connection is dropped without a response
                    error!("Request from {} failed: {:#}", peer, e);
                }
            });
        }
    }
}

async fn handle_request(
    stream: TcpStream,
    orchestrator: &RecommendationOrchestrator,
    feed: &RecommendationFeed,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let request: MasterRequest = read_frame(&mut reader)
        .await
        .context("Failed to read master request")?;

    match request {
        MasterRequest::Recommend(request) => {
            recommend(request, &mut writer, orchestrator, feed).await
        }
        MasterRequest::Feed(FeedRequest {
            feed: FeedMode::Latest,
        }) => {
            let latest = feed.latest().await;
            write_frame(&mut writer, latest.as_slice())
                .await
                .context("Failed to send latest recommendations")
        }
        MasterRequest::Feed(FeedRequest {
            feed: FeedMode::Watch,
        }) => watch(&mut writer, feed).await,
    }
}

async fn recommend(
    request: RecommendationRequest,
    writer: &mut OwnedWriteHalf,
    orchestrator: &RecommendationOrchestrator,
    feed: &RecommendationFeed,
) -> Result<()> {
    info!(
        "Request for {:?}, max {} results",
        request.categories, request.max_results
    );

    let report = orchestrator.get_recommendations(&request).await?;
    if !report.is_complete() {
        warn!(
            "Partial results: {}/{} partitions succeeded",
            report.partitions_succeeded, report.partitions_total
        );
    }

    write_frame(writer, &report.results)
        .await
        .context("Failed to send recommendations")?;

    feed.publish(report.results).await;
    Ok(())
}

/// Stream every published snapshot until the watcher goes away
async fn watch(writer: &mut OwnedWriteHalf, feed: &RecommendationFeed) -> Result<()> {
    let mut updates = feed.subscribe();
    info!("Feed watcher joined ({} subscribers)", feed.subscriber_count());

    loop {
        match updates.recv().await {
            Ok(snapshot) => {
                if let Err(e) = write_frame(writer, snapshot.as_slice()).await {
                    debug!("Feed watcher disconnected: {}", e);
                    return Ok(());
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Feed watcher lagged, skipped {} snapshots", skipped);
            }
            Err(RecvError::Closed) => return Ok(()),
        }
    }
}
