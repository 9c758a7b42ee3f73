//! I/O operations with trait abstraction.

mod download;
mod engine;
mod http;
mod pool;
mod staging;
mod upload;
mod walk;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::core::retry_delay;
use crate::data::{Progress, TransferStage};
use crate::error::{Result, TransferError};

pub use engine::TransferEngine;
pub use http::{BoxStream, ByteStream, RemoteFile, RemoteStore, UploadFlags};

#[cfg(feature = "reqwest")]
pub use http::ReqwestStore;

/// Callback invoked on stage transitions and chunk writes.
pub type ProgressFn = Arc<dyn Fn(&Progress) + Send + Sync>;

/// Bounded retry around one unit of work.
///
/// Only transient errors loop; every other classification returns on the
/// first attempt. Exhausting the cap converts the last transient error into
/// `TransientExhausted` with the total attempt count.
pub(crate) async fn with_retry<T, F, Fut>(retries: u32, backoff: Duration, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                if attempt >= retries {
                    return Err(TransferError::TransientExhausted {
                        attempts: attempt + 1,
                        last: e.to_string(),
                    });
                }
                tracing::warn!(attempt, error = %e, "transient failure, retrying");
                tokio::time::sleep(retry_delay(attempt, backoff)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

pub(crate) fn notify(
    on_progress: &Option<ProgressFn>,
    path: &str,
    stage: TransferStage,
    bytes_delta: u64,
    total_bytes: Option<u64>,
) {
    if let Some(callback) = on_progress {
        callback(&Progress {
            path: path.to_string(),
            stage,
            bytes_delta,
            total_bytes,
        });
    }
}
