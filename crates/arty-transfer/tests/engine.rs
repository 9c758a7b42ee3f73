//! End-to-end engine tests against an in-memory remote store.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{StreamExt, stream};

use arty_transfer::{
    ByteStream, EngineConfig, FailureKind, FilePath, Outcome, PathPattern, RemoteFile,
    RemoteStore, Result, TransferEngine, TransferError, UploadFlags, VersionCoord,
};

/// In-memory store. Failures, delays and published files are scripted per
/// test; counters are shared so tests keep handles after the engine takes
/// ownership.
struct MockStore {
    files: HashMap<String, Bytes>,
    published: HashSet<String>,
    auth_fail: bool,
    /// Serve every fetched body one byte short of what was asked for.
    short_fetch: bool,
    delay: Duration,
    /// Extra delay per range, keyed by range start. Used to force
    /// out-of-order completion.
    range_delays: HashMap<u64, Duration>,
    /// Remaining transient failures, keyed by (path, range start).
    fail_plan: Mutex<HashMap<(String, u64), u32>>,
    uploads: Arc<Mutex<Vec<(String, usize)>>>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockStore {
    fn new() -> Self {
        Self {
            files: HashMap::new(),
            published: HashSet::new(),
            auth_fail: false,
            short_fetch: false,
            delay: Duration::ZERO,
            range_delays: HashMap::new(),
            fail_plan: Mutex::new(HashMap::new()),
            uploads: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn with_file(mut self, path: &str, content: impl Into<Bytes>) -> Self {
        self.files.insert(path.to_string(), content.into());
        self
    }

    fn with_published(mut self, path: &str) -> Self {
        self.published.insert(path.to_string());
        self
    }

    fn with_transient_failures(self, path: &str, start: u64, count: u32) -> Self {
        self.fail_plan
            .lock()
            .unwrap()
            .insert((path.to_string(), start), count);
        self
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn take_failure(&self, path: &str, start: u64) -> bool {
        let mut plan = self.fail_plan.lock().unwrap();
        match plan.get_mut(&(path.to_string(), start)) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl RemoteStore for MockStore {
    async fn list_version_files(&self, coord: &VersionCoord) -> Result<Vec<RemoteFile>> {
        let prefix = format!("{}/{}/", coord.subject, coord.repo);
        let mut out: Vec<RemoteFile> = self
            .files
            .iter()
            .filter_map(|(path, content)| {
                path.strip_prefix(&prefix).map(|rel| RemoteFile {
                    path: rel.to_string(),
                    size: content.len() as u64,
                })
            })
            .collect();
        out.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(out)
    }

    async fn file_size(&self, remote_path: &str) -> Result<u64> {
        self.files
            .get(remote_path)
            .map(|c| c.len() as u64)
            .ok_or_else(|| TransferError::Client(format!("404 for '{remote_path}'")))
    }

    async fn fetch(&self, remote_path: &str, range: Option<(u64, u64)>) -> Result<ByteStream> {
        self.enter().await;
        let start = range.map_or(0, |(s, _)| s);
        let delay = self.range_delays.get(&start).copied().unwrap_or(self.delay);
        tokio::time::sleep(delay).await;
        self.leave();

        if self.auth_fail {
            return Err(TransferError::Auth(format!("401 for '{remote_path}'")));
        }
        if self.take_failure(remote_path, start) {
            return Err(TransferError::Transient(format!(
                "connection reset for '{remote_path}'"
            )));
        }
        let content = self
            .files
            .get(remote_path)
            .ok_or_else(|| TransferError::Client(format!("404 for '{remote_path}'")))?;
        let mut slice = match range {
            Some((s, e)) => content.slice(s as usize..e as usize),
            None => content.clone(),
        };
        if self.short_fetch && !slice.is_empty() {
            slice = slice.slice(..slice.len() - 1);
        }
        let chunks: Vec<Result<Bytes>> = slice
            .chunks(1024)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn upload(
        &self,
        remote_path: &str,
        content: ByteStream,
        len: u64,
        flags: UploadFlags,
    ) -> Result<()> {
        self.enter().await;
        tokio::time::sleep(self.delay).await;
        self.leave();

        if self.auth_fail {
            return Err(TransferError::Auth(format!("401 for '{remote_path}'")));
        }
        if self.take_failure(remote_path, 0) {
            return Err(TransferError::Transient(format!(
                "timeout for '{remote_path}'"
            )));
        }
        if self.published.contains(remote_path) && !flags.override_existing {
            return Err(TransferError::Client(format!(
                "409 conflict: '{remote_path}' is already published"
            )));
        }
        let mut content = content;
        let mut received = 0usize;
        while let Some(chunk) = content.next().await {
            received += chunk?.len();
        }
        assert_eq!(received as u64, len, "declared body length must match");
        self.uploads
            .lock()
            .unwrap()
            .push((remote_path.to_string(), received));
        Ok(())
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        retries: 2,
        retry_backoff: Duration::from_millis(1),
        ..Default::default()
    }
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn coord() -> VersionCoord {
    VersionCoord::parse("acme/repo/pkg/1.0").unwrap()
}

fn write_local(dir: &std::path::Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn split_download_is_byte_identical_despite_reordering() {
    let content = patterned(10_000);
    // Later ranges finish first: range 0 sleeps longest.
    let mut store = MockStore::new().with_file("acme/repo/dist/file.bin", content.clone());
    for (i, start) in [0u64, 2500, 5000, 7500].iter().enumerate() {
        store
            .range_delays
            .insert(*start, Duration::from_millis(40 - 10 * i as u64));
    }

    let out = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        min_split_kb: 1,
        split_count: 4,
        threads: 4,
        target_root: out.path().to_path_buf(),
        flat: false,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let report = engine
        .download_file(&FilePath::parse("acme/repo/dist/file.bin").unwrap())
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert!(report.is_success());
    assert_eq!(report.total_bytes(), 10_000);
    let written = std::fs::read(out.path().join("dist/file.bin")).unwrap();
    assert_eq!(written, content);
}

#[tokio::test]
async fn failed_range_fails_file_with_no_partial_target() {
    let content = patterned(8_192);
    let store = MockStore::new()
        .with_file("acme/repo/big.bin", content)
        // More failures than the retry cap allows.
        .with_transient_failures("acme/repo/big.bin", 2048, 10);

    let out = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        min_split_kb: 1,
        split_count: 4,
        threads: 4,
        target_root: out.path().to_path_buf(),
        flat: true,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let report = engine
        .download_file(&FilePath::parse("acme/repo/big.bin").unwrap())
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert!(!report.is_success());
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureKind::TransientExhausted)
    );
    assert!(!out.path().join("big.bin").exists());
}

#[tokio::test]
async fn truncated_body_fails_integrity_with_no_target() {
    let mut store = MockStore::new().with_file("acme/repo/cut.bin", patterned(4_096));
    store.short_fetch = true;
    let calls = Arc::clone(&store.calls);

    let out = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        target_root: out.path().to_path_buf(),
        flat: true,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let report = engine
        .download_file(&FilePath::parse("acme/repo/cut.bin").unwrap())
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureKind::Integrity)
    );
    // A size mismatch is terminal, never retried.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!out.path().join("cut.bin").exists());
}

#[tokio::test]
async fn dry_run_upload_skips_without_network() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10 {
        write_local(dir.path(), &format!("f{i}.zip"), b"data");
    }
    let store = MockStore::new();
    let calls = Arc::clone(&store.calls);

    let config = EngineConfig {
        dry_run: true,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/*.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();

    assert_eq!(report.skipped(), 10);
    assert_eq!(report.failed(), 0);
    assert!(report.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrency_stays_within_thread_bound() {
    for threads in [1usize, 3, 8] {
        let mut store = MockStore::new();
        for i in 0..10 {
            store = store.with_file(&format!("acme/repo/f{i}.bin"), patterned(100));
        }
        store.delay = Duration::from_millis(5);
        let max_in_flight = Arc::clone(&store.max_in_flight);

        let out = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            threads,
            split_count: 0,
            target_root: out.path().to_path_buf(),
            ..fast_config()
        };
        let engine = TransferEngine::new(store, config).unwrap();
        let report = engine
            .download_version(&coord(), &PathPattern::wildcard("*", true))
            .await
            .unwrap();

        assert_eq!(report.succeeded(), 10);
        assert!(
            max_in_flight.load(Ordering::SeqCst) <= threads,
            "threads={threads} exceeded its bound"
        );
    }
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let dir = tempfile::tempdir().unwrap();
    write_local(dir.path(), "a.zip", b"data");
    let mut store = MockStore::new();
    store.auth_fail = true;
    let calls = Arc::clone(&store.calls);

    let engine = TransferEngine::new(store, fast_config()).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/a.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Failed(FailureKind::Auth));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transient_failures_retry_until_success() {
    let dir = tempfile::tempdir().unwrap();
    write_local(dir.path(), "a.zip", b"payload");
    let store = MockStore::new().with_transient_failures("acme/repo/pkg/1.0/a.zip", 0, 2);
    let calls = Arc::clone(&store.calls);
    let uploads = Arc::clone(&store.uploads);

    let config = EngineConfig {
        retries: 3,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/a.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn exhausted_retries_mark_transient_exhausted() {
    let dir = tempfile::tempdir().unwrap();
    write_local(dir.path(), "a.zip", b"payload");
    let store = MockStore::new().with_transient_failures("acme/repo/pkg/1.0/a.zip", 0, 10);
    let calls = Arc::clone(&store.calls);

    let engine = TransferEngine::new(store, fast_config()).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/a.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();

    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureKind::TransientExhausted)
    );
    // Initial attempt plus the two retries of fast_config.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn published_file_rejected_without_override() {
    let dir = tempfile::tempdir().unwrap();
    write_local(dir.path(), "a.zip", b"v2");
    write_local(dir.path(), "b.zip", b"new");
    let store = MockStore::new().with_published("acme/repo/pkg/1.0/a.zip");
    let uploads = Arc::clone(&store.uploads);

    let engine = TransferEngine::new(store, fast_config()).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/*.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();

    // The conflict is a per-job failure; the sibling upload still lands.
    assert_eq!(report.failed(), 1);
    assert_eq!(report.succeeded(), 1);
    let recorded = uploads.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].0, "acme/repo/pkg/1.0/b.zip");
}

#[tokio::test]
async fn override_allows_republish() {
    let dir = tempfile::tempdir().unwrap();
    write_local(dir.path(), "a.zip", b"v2");
    let store = MockStore::new().with_published("acme/repo/pkg/1.0/a.zip");
    let uploads = Arc::clone(&store.uploads);

    let config = EngineConfig {
        override_existing: true,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/a.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(uploads.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn download_version_respects_pattern_and_recursion() {
    let store = MockStore::new()
        .with_file("acme/repo/a.jar", patterned(100))
        .with_file("acme/repo/docs/b.jar", patterned(50))
        .with_file("acme/repo/c.txt", patterned(10));

    let out = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        split_count: 0,
        flat: false,
        target_root: out.path().to_path_buf(),
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let report = engine
        .download_version(&coord(), &PathPattern::wildcard("*.jar", false))
        .await
        .unwrap();

    // Non-recursive: the nested jar is excluded.
    assert_eq!(report.succeeded(), 1);
    assert!(out.path().join("a.jar").exists());
    assert!(!out.path().join("docs/b.jar").exists());
}

#[tokio::test]
async fn download_version_recursive_keeps_hierarchy() {
    let store = MockStore::new()
        .with_file("acme/repo/a.jar", patterned(100))
        .with_file("acme/repo/docs/b.jar", patterned(50));

    let out = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        split_count: 0,
        flat: false,
        target_root: out.path().to_path_buf(),
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let report = engine
        .download_version(&coord(), &PathPattern::wildcard("*.jar", true))
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    assert!(out.path().join("a.jar").exists());
    assert!(out.path().join("docs/b.jar").exists());
}

#[tokio::test]
async fn empty_remote_file_downloads_empty() {
    let store = MockStore::new().with_file("acme/repo/empty.bin", Vec::new());

    let out = tempfile::tempdir().unwrap();
    let config = EngineConfig {
        target_root: out.path().to_path_buf(),
        flat: true,
        ..fast_config()
    };
    let engine = TransferEngine::new(store, config).unwrap();
    let report = engine
        .download_file(&FilePath::parse("acme/repo/empty.bin").unwrap())
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert_eq!(
        std::fs::read(out.path().join("empty.bin")).unwrap(),
        Vec::<u8>::new()
    );
}

#[tokio::test]
async fn zero_threads_is_invalid_configuration() {
    let config = EngineConfig {
        threads: 0,
        ..fast_config()
    };
    let err = TransferEngine::new(MockStore::new(), config).unwrap_err();
    assert!(matches!(err, TransferError::InvalidConfig(_)));
}

#[tokio::test]
async fn no_matches_yields_empty_successful_report() {
    let dir = tempfile::tempdir().unwrap();
    let engine = TransferEngine::new(MockStore::new(), fast_config()).unwrap();
    let pattern = PathPattern::wildcard(format!("{}/*.zip", dir.path().display()), true);
    let report = engine.upload(&pattern, &coord(), "").await.unwrap();
    assert!(report.is_empty());
    assert!(report.is_success());
}

#[tokio::test]
async fn bad_regex_fails_before_any_job() {
    let engine = TransferEngine::new(MockStore::new(), fast_config()).unwrap();
    let err = engine
        .download_version(&coord(), &PathPattern::regex("(unclosed", true))
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Pattern(_)));
}
