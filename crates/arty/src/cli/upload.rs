use anyhow::{Context, Result, bail};
use arty_transfer::{
    EngineConfig, PathPattern, ReqwestStore, TransferEngine, VersionCoord,
};

use crate::cli::app::UploadArg;
use crate::cli::{context, report};
use crate::utils::task_pool::POOL;
use crate::utils::ui::tracker::Tracker;

pub fn upload(arg: UploadArg) -> Result<i32> {
    let ctx = context::build(&arg.auth)?;
    let (coord, prefix) = split_target(&arg.target)?;

    let config = EngineConfig {
        threads: arg.threads,
        flat: arg.flat,
        dry_run: arg.dry_run,
        publish: arg.publish,
        override_existing: arg.override_existing,
        explode: arg.explode,
        ..Default::default()
    };
    let pattern = if arg.regexp {
        PathPattern::regex(&arg.pattern, arg.recursive)
    } else {
        PathPattern::wildcard(&arg.pattern, arg.recursive)
    };

    let store = ReqwestStore::new(ctx)?;
    let tracker = report::tracker();
    let engine = TransferEngine::new(store, config)?
        .with_progress(report::progress_callback(&tracker));
    report::arm_interrupt(engine.cancel_flag());

    let transferred = POOL
        .block_on(engine.upload(&pattern, &coord, &prefix))
        .with_context(|| format!("uploading '{}'", arg.pattern))?;
    tracker.finish(None);

    report::print(&transferred);
    Ok(report::exit_code(&transferred))
}

/// Split `subject/repo/package/version[/path/]` into the version coordinate
/// and the optional target path.
fn split_target(target: &str) -> Result<(VersionCoord, String)> {
    let trimmed = target.trim_start_matches('/');
    let parts: Vec<&str> = trimmed.splitn(5, '/').collect();
    if parts.len() < 4 {
        bail!("expected an upload target of the form subject/repo/package/version[/path/]");
    }
    let coord = VersionCoord::parse(&parts[..4].join("/"))?;
    let prefix = parts.get(4).copied().unwrap_or_default().to_string();
    Ok((coord, prefix))
}
