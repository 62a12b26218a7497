//! Error types for the worker engine.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Every similarity entry holds the same value, so min-max scaling
    /// would divide by zero
    #[error("Cannot min-max scale a single-valued similarity set (value: {value})")]
    DegenerateScale { value: f64 },
}

pub type Result<T> = std::result::Result<T, EngineError>;
