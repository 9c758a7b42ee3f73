use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::download::{self, DownloadItem, DownloadState};
use super::http::{RemoteFile, RemoteStore};
use super::pool::run_pool;
use super::{ProgressFn, notify, upload, walk};
use crate::core::{CompiledPattern, download_target, plan_ranges, upload_target};
use crate::data::{
    EngineConfig, FailureKind, FilePath, JobKind, PathPattern, TransferJob, TransferReport,
    TransferResult, TransferStage, VersionCoord,
};
use crate::error::Result;

/// The bulk transfer engine: discovery, planning, bounded execution and
/// result aggregation over one [`RemoteStore`].
///
/// Configuration and pattern errors fail the whole invocation before any
/// job starts; per-job failures are captured into the returned report and
/// never abort sibling jobs.
pub struct TransferEngine<S: RemoteStore + 'static> {
    store: Arc<S>,
    config: Arc<EngineConfig>,
    cancel: Arc<AtomicBool>,
    on_progress: Option<ProgressFn>,
}

impl<S: RemoteStore + 'static> std::fmt::Debug for TransferEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferEngine").finish_non_exhaustive()
    }
}

impl<S: RemoteStore + 'static> TransferEngine<S> {
    /// Validates the configuration up front; bad flag values never reach
    /// the matcher.
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: Arc::new(store),
            config: Arc::new(config),
            cancel: Arc::new(AtomicBool::new(false)),
            on_progress: None,
        })
    }

    pub fn with_progress(mut self, callback: ProgressFn) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Shared flag that stops queue admission when set; in-flight jobs
    /// finish or fail naturally.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Upload every local file matching `pattern` into the given version,
    /// under an optional target prefix.
    pub async fn upload(
        &self,
        pattern: &PathPattern,
        coord: &VersionCoord,
        target: &str,
    ) -> Result<TransferReport> {
        let candidates = walk::collect_upload_candidates(pattern)?;
        let jobs: Vec<TransferJob> = candidates
            .into_iter()
            .map(|c| {
                let remote_rel = upload_target(target, &c.rel, self.config.flat);
                TransferJob {
                    kind: JobKind::Upload,
                    source: c.path.to_string_lossy().into_owned(),
                    target: format!(
                        "{}/{}/{}/{}/{}",
                        coord.subject, coord.repo, coord.package, coord.version, remote_rel
                    ),
                    size: None,
                }
            })
            .collect();

        if jobs.is_empty() {
            tracing::warn!(pattern = %pattern.raw, "no files matched the upload pattern");
            return Ok(TransferReport::default());
        }

        if self.config.dry_run {
            let mut report = TransferReport::default();
            for job in jobs {
                tracing::info!(source = %job.source, target = %job.target, "dry run, skipping upload");
                report.push(TransferResult::skipped(job));
            }
            return Ok(report);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        let on_progress = self.on_progress.clone();
        run_pool(
            self.config.threads,
            jobs,
            Arc::clone(&self.cancel),
            move |job| {
                let store = Arc::clone(&store);
                let config = Arc::clone(&config);
                let tx = tx.clone();
                let on_progress = on_progress.clone();
                async move {
                    let result =
                        upload::execute_upload(store.as_ref(), &config, job, &on_progress).await;
                    let _ = tx.send(result);
                }
            },
        )
        .await;

        Ok(drain(rx).await)
    }

    /// Download every file of a version whose remote path matches `pattern`.
    pub async fn download_version(
        &self,
        coord: &VersionCoord,
        pattern: &PathPattern,
    ) -> Result<TransferReport> {
        let compiled = CompiledPattern::compile(pattern)?;
        let mut files = self.store.list_version_files(coord).await?;
        files.retain(|f| compiled.matches(&f.path));
        files.sort_by(|a, b| a.path.cmp(&b.path));
        if files.is_empty() {
            tracing::warn!(pattern = %pattern.raw, "no remote files matched");
            return Ok(TransferReport::default());
        }
        self.download_files(&coord.repo_prefix(), files).await
    }

    /// Download one file addressed directly on the download server.
    pub async fn download_file(&self, file: &FilePath) -> Result<TransferReport> {
        let size = self.store.file_size(&file.remote_path()).await?;
        let files = vec![RemoteFile {
            path: file.path.clone(),
            size,
        }];
        self.download_files(&format!("{}/{}", file.subject, file.repo), files)
            .await
    }

    async fn download_files(
        &self,
        prefix: &str,
        files: Vec<RemoteFile>,
    ) -> Result<TransferReport> {
        let mut report = TransferReport::default();
        let mut items: Vec<DownloadItem> = Vec::new();

        for file in files {
            let target = self
                .config
                .target_root
                .join(download_target(&file.path, self.config.flat));
            let job = TransferJob {
                kind: JobKind::Download,
                source: format!("{prefix}/{}", file.path),
                target: target.to_string_lossy().into_owned(),
                size: Some(file.size),
            };

            if self.config.dry_run {
                tracing::info!(source = %job.source, target = %job.target, "dry run, skipping download");
                report.push(TransferResult::skipped(job));
                continue;
            }

            let plan = plan_ranges(
                file.size,
                self.config.min_split_bytes(),
                self.config.split_count,
            );
            notify(
                &self.on_progress,
                &job.source,
                TransferStage::Planned,
                0,
                Some(file.size),
            );
            match DownloadState::new(job.clone(), target, file.size, plan) {
                Ok(state) => {
                    let state = Arc::new(state);
                    items.extend(DownloadState::items(&state));
                }
                Err(e) => report.push(TransferResult::failed(job, FailureKind::Io, e.to_string())),
            }
        }

        if items.is_empty() {
            return Ok(report);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let store = Arc::clone(&self.store);
        let config = Arc::clone(&self.config);
        let on_progress = self.on_progress.clone();
        run_pool(
            self.config.threads,
            items,
            Arc::clone(&self.cancel),
            move |item| {
                let store = Arc::clone(&store);
                let config = Arc::clone(&config);
                let tx = tx.clone();
                let on_progress = on_progress.clone();
                async move {
                    download::run_item(store.as_ref(), &config, item, &tx, &on_progress).await;
                }
            },
        )
        .await;

        let mut executed = drain(rx).await;
        report.results.append(&mut executed.results);
        Ok(report)
    }
}

async fn drain(mut rx: UnboundedReceiver<TransferResult>) -> TransferReport {
    let mut report = TransferReport::default();
    while let Some(result) = rx.recv().await {
        report.push(result);
    }
    report
}
