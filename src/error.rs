//! Error handling for imu-blocks
//!
//! Graph-level failures are [`PipelineError`]s. This module wraps them, along
//! with configuration, session and IO failures, into the application error
//! type and provides a Result alias for use throughout the crate.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for imu-blocks operations
#[derive(Error, Debug)]
pub enum ImuError {
    /// Errors raised by the block graph
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to session metadata or recorder state
    #[error("Session error: {0}")]
    Session(String),

    /// Errors related to the graph worker thread
    #[error("Worker error: {0}")]
    Worker(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ImuError>,
    },
}

impl ImuError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ImuError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for ImuError {
    fn from(err: serde_json::Error) -> Self {
        ImuError::Serialization(err.to_string())
    }
}

/// Result type alias for imu-blocks operations
pub type Result<T> = std::result::Result<T, ImuError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, PipelineError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ImuError::from(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ImuError::from(e).with_context(f()))
    }
}
