//! Error types for the cluster master.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClusterError {
    /// A caller-supplied argument is out of range (e.g. zero partitions)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration value could not be parsed
    #[error("Invalid configuration value for {key}: '{value}' ({reason})")]
    Config {
        key: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
