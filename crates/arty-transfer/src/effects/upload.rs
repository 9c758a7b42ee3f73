use futures_util::StreamExt;
use tokio_util::io::ReaderStream;

use super::http::{ByteStream, RemoteStore, UploadFlags};
use super::{ProgressFn, notify, with_retry};
use crate::data::{EngineConfig, FailureKind, TransferJob, TransferResult, TransferStage};
use crate::error::TransferError;

/// Run one whole-file upload under the retry policy.
///
/// The source streams straight off disk; each attempt re-opens it so a
/// retried upload starts from the beginning. Local read failures are
/// terminal immediately; network failures go through the shared retry loop.
/// Always produces exactly one result.
pub(crate) async fn execute_upload<S: RemoteStore>(
    store: &S,
    config: &EngineConfig,
    job: TransferJob,
    on_progress: &Option<ProgressFn>,
) -> TransferResult {
    let len = match tokio::fs::metadata(&job.source).await {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::warn!(source = %job.source, error = %e, "cannot read upload source");
            return TransferResult::failed(job, FailureKind::Io, e.to_string());
        }
    };
    let flags = UploadFlags {
        publish: config.publish,
        override_existing: config.override_existing,
        explode: config.explode,
    };

    notify(on_progress, &job.target, TransferStage::Fetching, 0, Some(len));
    let sent = with_retry(config.retries, config.retry_backoff, || async {
        let file = tokio::fs::File::open(&job.source).await?;
        let body: ByteStream =
            Box::pin(ReaderStream::new(file).map(|chunk| chunk.map_err(TransferError::from)));
        store.upload(&job.target, body, len, flags).await
    })
    .await;

    match sent {
        Ok(()) => {
            tracing::debug!(source = %job.source, target = %job.target, bytes = len, "uploaded");
            notify(on_progress, &job.target, TransferStage::Complete, len, Some(len));
            TransferResult::succeeded(job, len)
        }
        Err(e) => {
            tracing::warn!(source = %job.source, target = %job.target, error = %e, "upload failed");
            notify(on_progress, &job.target, TransferStage::Failed, 0, Some(len));
            let kind = FailureKind::from(&e);
            TransferResult::failed(job, kind, e.to_string())
        }
    }
}
