use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arty_transfer::{ProgressFn, TransferReport, TransferStage};

use crate::utils::task_pool::POOL;
use crate::utils::ui::tracker::{ProgressTracker, ProgressTrackerConfig, Tracker};

/// Byte-rate tracker fed by the engine's progress callback.
pub fn tracker() -> ProgressTracker {
    ProgressTracker::new(ProgressTrackerConfig { len: None })
}

pub fn progress_callback(tracker: &ProgressTracker) -> ProgressFn {
    let pb = tracker.pb.clone();
    Arc::new(move |p| {
        if p.bytes_delta > 0 {
            pb.inc(p.bytes_delta);
        }
        if p.stage == TransferStage::Failed {
            pb.set_message(format!("failed: {}", p.path));
        }
    })
}

/// Arm a ctrl-c handler that stops queue admission; in-flight jobs drain.
pub fn arm_interrupt(cancel: Arc<AtomicBool>) {
    POOL.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, letting in-flight transfers drain");
            cancel.store(true, Ordering::Relaxed);
        }
    });
}

/// One line per job plus an aggregate summary, completion order.
pub fn print(report: &TransferReport) {
    for r in &report.results {
        match &r.error {
            Some(err) => println!("{} {} -> {}: {err}", r.outcome, r.job.source, r.job.target),
            None => println!("{} {} -> {}", r.outcome, r.job.source, r.job.target),
        }
    }
    println!(
        "{} succeeded, {} failed, {} skipped, {} bytes transferred",
        report.succeeded(),
        report.failed(),
        report.skipped(),
        report.total_bytes()
    );
}

/// Non-zero iff any job failed. A dry run never fails.
pub fn exit_code(report: &TransferReport) -> i32 {
    if report.is_success() { 0 } else { 1 }
}
