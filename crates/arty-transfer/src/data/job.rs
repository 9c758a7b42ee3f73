use std::fmt;

use crate::error::TransferError;

/// Direction of one unit of work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobKind {
    Upload,
    Download,
}

/// One file-level transfer, created by discovery and consumed exactly once
/// by a worker. Every job yields exactly one [`TransferResult`].
#[derive(Clone, Debug)]
pub struct TransferJob {
    pub kind: JobKind,
    /// Local path for uploads, remote path for downloads.
    pub source: String,
    /// Remote path for uploads, local path for downloads.
    pub target: String,
    /// Known remote size, downloads only.
    pub size: Option<u64>,
}

/// Broad reason a job ended in `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// A transient error survived every retry.
    TransientExhausted,
    /// Authentication or authorization was rejected; never retried.
    Auth,
    /// The server rejected the request (4xx); never retried.
    Client,
    /// Local disk failure; never retried.
    Io,
    /// Reassembled file did not match the expected size.
    Integrity,
}

impl From<&TransferError> for FailureKind {
    fn from(e: &TransferError) -> Self {
        match e {
            TransferError::Transient(_) | TransferError::TransientExhausted { .. } => {
                FailureKind::TransientExhausted
            }
            TransferError::Auth(_) => FailureKind::Auth,
            TransferError::Client(_)
            | TransferError::InvalidConfig(_)
            | TransferError::Pattern(_) => FailureKind::Client,
            TransferError::Io(_) => FailureKind::Io,
            TransferError::Integrity { .. } => FailureKind::Integrity,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::TransientExhausted => write!(f, "transient-exhausted"),
            FailureKind::Auth => write!(f, "auth"),
            FailureKind::Client => write!(f, "client"),
            FailureKind::Io => write!(f, "io"),
            FailureKind::Integrity => write!(f, "integrity"),
        }
    }
}

/// Terminal state of a job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(FailureKind),
    /// Dry run: resolved and reported, no network activity.
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => write!(f, "ok"),
            Outcome::Failed(kind) => write!(f, "failed({kind})"),
            Outcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Immutable record of one finished job, produced by a worker and consumed
/// by the reporter.
#[derive(Clone, Debug)]
pub struct TransferResult {
    pub job: TransferJob,
    pub outcome: Outcome,
    pub error: Option<String>,
    pub bytes: u64,
}

impl TransferResult {
    pub fn succeeded(job: TransferJob, bytes: u64) -> Self {
        Self {
            job,
            outcome: Outcome::Succeeded,
            error: None,
            bytes,
        }
    }

    pub fn failed(job: TransferJob, kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            job,
            outcome: Outcome::Failed(kind),
            error: Some(error.into()),
            bytes: 0,
        }
    }

    pub fn skipped(job: TransferJob) -> Self {
        Self {
            job,
            outcome: Outcome::Skipped,
            error: None,
            bytes: 0,
        }
    }
}
