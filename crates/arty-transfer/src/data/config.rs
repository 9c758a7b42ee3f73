use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TransferError};

/// Read-only engine configuration, built once per invocation from CLI flags
/// and passed by reference to every component.
///
/// Boolean policy flags (`publish`, `override_existing`, `explode`) are
/// opaque to the engine; they are forwarded verbatim to the upload call.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Number of concurrent workers draining the job queue.
    pub threads: usize,
    /// Minimum file size in KB before a download is split into ranges.
    /// `-1` disables splitting unconditionally.
    pub min_split_kb: i64,
    /// Number of ranges a split download is divided into. `0` disables
    /// splitting; the maximum is 15.
    pub split_count: i32,
    /// Discard directory hierarchy at the destination.
    pub flat: bool,
    /// Resolve and report every job without any network activity.
    pub dry_run: bool,
    pub publish: bool,
    pub override_existing: bool,
    pub explode: bool,
    /// Directory downloaded files are placed under.
    pub target_root: PathBuf,
    /// Retry cap for transient failures, per unit of work.
    pub retries: u32,
    /// Base delay for exponential retry backoff.
    pub retry_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 3,
            min_split_kb: 5120,
            split_count: 3,
            flat: true,
            dry_run: false,
            publish: false,
            override_existing: false,
            explode: false,
            target_root: PathBuf::from("."),
            retries: 3,
            retry_backoff: Duration::from_millis(100),
        }
    }
}

impl EngineConfig {
    /// Reject bad flag values before any matching or transfer starts.
    pub fn validate(&self) -> Result<()> {
        if self.threads < 1 {
            return Err(TransferError::InvalidConfig(
                "the threads option requires a positive value".into(),
            ));
        }
        if self.split_count < 0 {
            return Err(TransferError::InvalidConfig(
                "the split-count option cannot have a negative value".into(),
            ));
        }
        if self.split_count > 15 {
            return Err(TransferError::InvalidConfig(
                "the split-count option is limited to a maximum of 15".into(),
            ));
        }
        Ok(())
    }

    /// Split threshold in bytes, preserving `-1` as the disabled marker.
    pub fn min_split_bytes(&self) -> i64 {
        if self.min_split_kb < 0 {
            -1
        } else {
            self.min_split_kb.saturating_mul(1024)
        }
    }
}

/// Connection details for one invocation: API endpoint, download server and
/// credentials. Supplied once and never mutated.
#[derive(Clone, Debug)]
pub struct RepoContext {
    pub api_url: String,
    pub download_url: String,
    pub user: String,
    pub key: String,
}

impl RepoContext {
    pub fn new(
        api_url: impl Into<String>,
        download_url: impl Into<String>,
        user: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: with_trailing_slash(api_url.into()),
            download_url: with_trailing_slash(download_url.into()),
            user: user.into(),
            key: key.into(),
        }
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.is_empty() && !url.ends_with('/') {
        url.push('/');
    }
    url
}
