use anyhow::{Context, Result};
use arty_transfer::{
    EngineConfig, FilePath, PathPattern, ReqwestStore, TransferEngine, TransferReport,
    VersionCoord,
};

use crate::cli::app::{DownloadFileArg, DownloadVerArg, SplitArg};
use crate::cli::{context, report};
use crate::utils::task_pool::POOL;
use crate::utils::ui::tracker::Tracker;

pub fn download_file(arg: DownloadFileArg) -> Result<i32> {
    let ctx = context::build(&arg.auth)?;
    let file = FilePath::parse(&arg.path)?;
    let config = download_config(arg.threads, arg.flat, &arg.split);

    let store = ReqwestStore::new(ctx)?;
    let tracker = report::tracker();
    let engine =
        TransferEngine::new(store, config)?.with_progress(report::progress_callback(&tracker));
    report::arm_interrupt(engine.cancel_flag());

    let transferred = POOL
        .block_on(engine.download_file(&file))
        .with_context(|| format!("downloading '{}'", arg.path))?;
    tracker.finish(None);

    finish(transferred)
}

pub fn download_version(arg: DownloadVerArg) -> Result<i32> {
    let ctx = context::build(&arg.auth)?;
    let coord = VersionCoord::parse(&arg.target)?;
    let config = download_config(arg.threads, arg.flat, &arg.split);
    let pattern = if arg.regexp {
        PathPattern::regex(&arg.pattern, arg.recursive)
    } else {
        PathPattern::wildcard(&arg.pattern, arg.recursive)
    };

    let store = ReqwestStore::new(ctx)?;
    let tracker = report::tracker();
    let engine =
        TransferEngine::new(store, config)?.with_progress(report::progress_callback(&tracker));
    report::arm_interrupt(engine.cancel_flag());

    let transferred = POOL
        .block_on(engine.download_version(&coord, &pattern))
        .with_context(|| format!("downloading version '{}'", arg.target))?;
    tracker.finish(None);

    finish(transferred)
}

fn download_config(threads: usize, flat: bool, split: &SplitArg) -> EngineConfig {
    EngineConfig {
        threads,
        flat,
        min_split_kb: split.min_split,
        split_count: split.split_count,
        ..Default::default()
    }
}

fn finish(report: TransferReport) -> Result<i32> {
    report::print(&report);
    Ok(report::exit_code(&report))
}
