//! Cluster configuration, read from environment variables with defaults.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use engine::DEGENERATE_SCALE_FALLBACK;

use crate::dispatcher::DispatchPolicy;
use crate::error::{ClusterError, Result};
use crate::prober::DEFAULT_PROBE_TIMEOUT;

const DEFAULT_WORKERS: &str = "localhost:9001,localhost:9002,localhost:9003";
const DEFAULT_MASTER_LISTEN_ADDR: &str = "0.0.0.0:9000";
const DEFAULT_RATINGS_PATH: &str = "data/amazon_reviews_cleaned.csv";
const DEFAULT_MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    /// Worker addresses; one partition is built per entry
    pub workers: Vec<String>,
    pub probe_timeout: Duration,
    pub dispatch: DispatchPolicy,
    pub master_listen_addr: String,
    pub ratings_path: PathBuf,
    pub max_results: usize,
    /// Scaled value workers use when every similarity entry is identical
    pub degenerate_fallback: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            workers: split_list(DEFAULT_WORKERS),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            dispatch: DispatchPolicy::default(),
            master_listen_addr: DEFAULT_MASTER_LISTEN_ADDR.to_string(),
            ratings_path: PathBuf::from(DEFAULT_RATINGS_PATH),
            max_results: DEFAULT_MAX_RESULTS,
            degenerate_fallback: DEGENERATE_SCALE_FALLBACK,
        }
    }
}

impl ClusterConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key → value source.
    ///
    /// Recognised keys: `CLUSTER_WORKERS` (comma separated), `PROBE_TIMEOUT_MS`,
    /// `EXCHANGE_TIMEOUT_MS` (0 disables the deadline), `DISPATCH_MAX_RETRIES`,
    /// `DISPATCH_RETRY_BACKOFF_MS`, `MASTER_LISTEN_ADDR`, `RATINGS_PATH`,
    /// `MAX_RESULTS`, `DEGENERATE_SCALE_FALLBACK`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let workers = lookup("CLUSTER_WORKERS")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.workers);

        let probe_timeout = parse_var::<u64>(&lookup, "PROBE_TIMEOUT_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.probe_timeout);

        let exchange_timeout = match parse_var::<u64>(&lookup, "EXCHANGE_TIMEOUT_MS")? {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.dispatch.exchange_timeout,
        };

        let dispatch = DispatchPolicy {
            exchange_timeout,
            max_retries: parse_var(&lookup, "DISPATCH_MAX_RETRIES")?
                .unwrap_or(defaults.dispatch.max_retries),
            retry_backoff: parse_var::<u64>(&lookup, "DISPATCH_RETRY_BACKOFF_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.dispatch.retry_backoff),
        };

        let degenerate_fallback = match parse_var::<f64>(&lookup, "DEGENERATE_SCALE_FALLBACK")? {
            Some(value) if !value.is_finite() => {
                return Err(ClusterError::Config {
                    key: "DEGENERATE_SCALE_FALLBACK".to_string(),
                    value: value.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
            Some(value) => value,
            None => defaults.degenerate_fallback,
        };

        Ok(Self {
            workers,
            probe_timeout,
            dispatch,
            master_listen_addr: lookup("MASTER_LISTEN_ADDR")
                .unwrap_or(defaults.master_listen_addr),
            ratings_path: lookup("RATINGS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.ratings_path),
            max_results: parse_var(&lookup, "MAX_RESULTS")?.unwrap_or(defaults.max_results),
            degenerate_fallback,
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ClusterError::Config {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

/// Split a comma separated list, dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
