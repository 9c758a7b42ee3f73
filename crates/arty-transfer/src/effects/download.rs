//! Download execution and reassembly.
//!
//! A file download moves through `Planned → Fetching → Merging → Verified →
//! Complete`, or `Failed` from any stage. Each planned range streams into
//! its own part file inside the job's staging workspace; the last range to
//! finish drives the merge. Ranges may complete in any order — merge
//! position comes from each range's offset, so the committed file is
//! byte-identical to a non-split download.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures_util::StreamExt;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use super::http::RemoteStore;
use super::staging::{StagingDir, commit_file};
use super::{ProgressFn, notify, with_retry};
use crate::core::{RangePlan, RangeSpec};
use crate::data::{EngineConfig, FailureKind, TransferJob, TransferResult, TransferStage};
use crate::error::{Result, TransferError};

/// Shared state of one file download, owned jointly by its range items.
pub(crate) struct DownloadState {
    pub job: TransferJob,
    target: PathBuf,
    expected: u64,
    /// Whole-file fetch: a single range covering `[0, expected)` requested
    /// without a Range header.
    whole: bool,
    ranges: Vec<RangeSpec>,
    staging: StagingDir,
    remaining: AtomicUsize,
    /// First failure wins; any failed range fails the whole job.
    error: Mutex<Option<TransferError>>,
    bytes: AtomicU64,
}

impl DownloadState {
    pub fn new(job: TransferJob, target: PathBuf, expected: u64, plan: RangePlan) -> std::io::Result<Self> {
        let (whole, ranges) = match plan {
            RangePlan::Whole => (
                true,
                vec![RangeSpec {
                    index: 0,
                    start: 0,
                    end: expected,
                }],
            ),
            RangePlan::Split(ranges) => (false, ranges),
        };
        Ok(Self {
            job,
            target,
            expected,
            whole,
            remaining: AtomicUsize::new(ranges.len()),
            ranges,
            staging: StagingDir::create()?,
            error: Mutex::new(None),
            bytes: AtomicU64::new(0),
        })
    }

    /// One pool item per planned range, so ranges of different files
    /// interleave on the shared worker pool.
    pub fn items(state: &Arc<Self>) -> Vec<DownloadItem> {
        state
            .ranges
            .iter()
            .map(|range| DownloadItem {
                state: Arc::clone(state),
                range: *range,
            })
            .collect()
    }
}

/// One queued unit of download work: a single range of a single file.
pub(crate) struct DownloadItem {
    state: Arc<DownloadState>,
    range: RangeSpec,
}

/// Fetch one range under the retry policy; the last range to terminate
/// finalizes the whole file.
pub(crate) async fn run_item<S: RemoteStore>(
    store: &S,
    config: &EngineConfig,
    item: DownloadItem,
    tx: &UnboundedSender<TransferResult>,
    on_progress: &Option<ProgressFn>,
) {
    let DownloadItem { state, range } = item;
    let part = state.staging.part_path(range.index);
    let span = if state.whole {
        None
    } else {
        Some((range.start, range.end))
    };

    let fetched = with_retry(config.retries, config.retry_backoff, || {
        fetch_to_file(
            store,
            &state.job.source,
            span,
            &part,
            range.len(),
            state.expected,
            on_progress,
        )
    })
    .await;

    match fetched {
        Ok(bytes) => {
            state.bytes.fetch_add(bytes, Ordering::Relaxed);
        }
        Err(e) => {
            let mut slot = state.error.lock().await;
            if slot.is_none() {
                *slot = Some(e);
            }
        }
    }

    // The last range to terminate, in any order, drives the transition.
    if state.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
        finalize(state, tx, on_progress).await;
    }
}

/// Stream one span into a part file. Each attempt recreates the file, so a
/// retried range starts clean.
async fn fetch_to_file<S: RemoteStore>(
    store: &S,
    remote: &str,
    span: Option<(u64, u64)>,
    part: &Path,
    expected_len: u64,
    total: u64,
    on_progress: &Option<ProgressFn>,
) -> Result<u64> {
    let mut stream = store.fetch(remote, span).await?;
    let mut file = tokio::fs::File::create(part).await?;
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        notify(
            on_progress,
            remote,
            TransferStage::Fetching,
            chunk.len() as u64,
            Some(total),
        );
    }
    file.flush().await?;
    if written != expected_len {
        return Err(TransferError::Integrity {
            expected: expected_len,
            actual: written,
        });
    }
    Ok(written)
}

async fn finalize(
    state: Arc<DownloadState>,
    tx: &UnboundedSender<TransferResult>,
    on_progress: &Option<ProgressFn>,
) {
    let job = state.job.clone();
    let failure = state.error.lock().await.take();
    if let Some(e) = failure {
        // No merge is attempted; dropping the state removes every part.
        tracing::warn!(file = %job.source, error = %e, "download failed");
        notify(on_progress, &job.source, TransferStage::Failed, 0, Some(state.expected));
        let kind = FailureKind::from(&e);
        let _ = tx.send(TransferResult::failed(job, kind, e.to_string()));
        return;
    }

    match merge_and_commit(&state, on_progress).await {
        Ok(()) => {
            let bytes = state.bytes.load(Ordering::Acquire);
            tracing::debug!(file = %job.source, target = %job.target, bytes, "download complete");
            notify(on_progress, &job.source, TransferStage::Complete, 0, Some(state.expected));
            let _ = tx.send(TransferResult::succeeded(job, bytes));
        }
        Err(e) => {
            tracing::warn!(file = %job.source, error = %e, "merge failed");
            notify(on_progress, &job.source, TransferStage::Failed, 0, Some(state.expected));
            let kind = FailureKind::from(&e);
            let _ = tx.send(TransferResult::failed(job, kind, e.to_string()));
        }
    }
}

/// Write every part at its range's offset, check the final size against the
/// expected size, then commit to the resolved target.
async fn merge_and_commit(state: &DownloadState, on_progress: &Option<ProgressFn>) -> Result<()> {
    notify(on_progress, &state.job.source, TransferStage::Merging, 0, Some(state.expected));
    let merged = state.staging.merged_path();
    let mut out = tokio::fs::File::create(&merged).await?;
    for range in &state.ranges {
        let mut part = tokio::fs::File::open(state.staging.part_path(range.index)).await?;
        out.seek(SeekFrom::Start(range.start)).await?;
        tokio::io::copy(&mut part, &mut out).await?;
    }
    out.flush().await?;
    drop(out);

    let actual = tokio::fs::metadata(&merged).await?.len();
    if actual != state.expected {
        return Err(TransferError::Integrity {
            expected: state.expected,
            actual,
        });
    }
    notify(on_progress, &state.job.source, TransferStage::Verified, 0, Some(state.expected));

    commit_file(&merged, &state.target)?;
    Ok(())
}
