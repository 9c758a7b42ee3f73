//! Error types for arty-transfer.

use std::io;
use thiserror::Error;

/// Failure taxonomy for the transfer engine.
///
/// `InvalidConfig` and `Pattern` are fatal to the whole invocation and are
/// raised before any job starts. The remaining variants are per-job: they are
/// captured into that job's [`crate::TransferResult`] and surfaced through the
/// final report instead of propagating up the call stack.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid match expression: {0}")]
    Pattern(String),

    #[error("transient network error: {0}")]
    Transient(String),

    #[error("retries exhausted after {attempts} attempts: {last}")]
    TransientExhausted { attempts: u32, last: String },

    #[error("authentication rejected: {0}")]
    Auth(String),

    #[error("request rejected: {0}")]
    Client(String),

    #[error("file I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("size mismatch after merge: expected {expected} bytes, got {actual}")]
    Integrity { expected: u64, actual: u64 },
}

impl TransferError {
    /// Whether another attempt of the same unit of work may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransferError::Transient(_))
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
