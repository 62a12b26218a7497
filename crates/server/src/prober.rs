//! Availability prober: which configured workers accept connections right now.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// Default connect deadline for a probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy)]
pub struct AvailabilityProber {
    timeout: Duration,
}

impl AvailabilityProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Probe every address concurrently and return, in input order, those
    /// that accepted a connection within the deadline.
    ///
    /// Probe connections are closed immediately. Failures are logged and the
    /// address is left out; nothing is retried.
    pub async fn probe(&self, addrs: &[String]) -> Vec<String> {
        let handles: Vec<_> = addrs
            .iter()
            .cloned()
            .map(|addr| {
                let deadline = self.timeout;
                tokio::spawn(async move {
                    let reachable = probe_one(&addr, deadline).await;
                    (addr, reachable)
                })
            })
            .collect();

        let mut available = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok((addr, true)) => available.push(addr),
                Ok((_, false)) => {}
                Err(e) => error!("Probe task failed: {}", e),
            }
        }

        debug!("{}/{} workers available", available.len(), addrs.len());
        available
    }
}

impl Default for AvailabilityProber {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

async fn probe_one(addr: &str, deadline: Duration) -> bool {
    match timeout(deadline, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            warn!("Worker {} is not available: {}", addr, e);
            false
        }
        Err(_) => {
            warn!("Worker {} did not accept within {:?}", addr, deadline);
            false
        }
    }
}
