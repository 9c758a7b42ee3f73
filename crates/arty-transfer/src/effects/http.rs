use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

use crate::data::VersionCoord;
use crate::error::Result;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Body stream with errors already classified into [`crate::TransferError`].
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// One entry of a remote version listing.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub size: u64,
}

/// Server-defined upload switches, forwarded verbatim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadFlags {
    pub publish: bool,
    pub override_existing: bool,
    pub explode: bool,
}

/// Remote repository abstraction consumed by the engine.
///
/// Implementations handle their own connection management and map transport
/// and status failures onto the engine's error taxonomy: timeouts, resets
/// and 5xx become `Transient`; 401/403 become `Auth`; remaining 4xx become
/// `Client`.
///
/// # Implementations
///
/// - [`ReqwestStore`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait RemoteStore: Send + Sync {
    /// List the files belonging to one package version: `{path, size}`
    /// entries with paths relative to the repository.
    fn list_version_files(
        &self,
        coord: &VersionCoord,
    ) -> impl Future<Output = Result<Vec<RemoteFile>>> + Send;

    /// Size in bytes of one remote file, without downloading it.
    fn file_size(&self, remote_path: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Stream a remote file's body. `range` is a half-open byte span
    /// `[start, end)`; `None` fetches the whole file.
    fn fetch(
        &self,
        remote_path: &str,
        range: Option<(u64, u64)>,
    ) -> impl Future<Output = Result<ByteStream>> + Send;

    /// Upload one file's content to `remote_path`. The body arrives as a
    /// stream of exactly `len` bytes so large artifacts are never buffered
    /// whole. Rejected when the file is already published and
    /// `override_existing` is not set; the remote artifact is left
    /// untouched in that case.
    fn upload(
        &self,
        remote_path: &str,
        content: ByteStream,
        len: u64,
        flags: UploadFlags,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use bytes::Bytes;
    use futures_util::StreamExt;
    use reqwest::StatusCode;

    use super::{ByteStream, RemoteFile, UploadFlags};
    use crate::data::{RepoContext, VersionCoord};
    use crate::error::{Result, TransferError};

    /// Production store backed by `reqwest`.
    ///
    /// Metadata and upload calls go to the API endpoint; content fetches go
    /// to the download server. Both authenticate with the invocation's
    /// user/key pair.
    pub struct ReqwestStore {
        client: reqwest::Client,
        ctx: RepoContext,
    }

    impl ReqwestStore {
        pub fn new(ctx: RepoContext) -> Result<Self> {
            let client = reqwest::Client::builder()
                .build()
                .map_err(|e| TransferError::Transient(e.to_string()))?;
            Ok(Self { client, ctx })
        }

        fn api(&self, tail: &str) -> String {
            format!("{}{tail}", self.ctx.api_url)
        }

        fn dl(&self, tail: &str) -> String {
            format!("{}{tail}", self.ctx.download_url)
        }

        fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
            req.basic_auth(&self.ctx.user, Some(&self.ctx.key))
        }
    }

    fn transport_error(e: reqwest::Error) -> TransferError {
        // Connection failures, timeouts and interrupted bodies may all
        // succeed on another attempt.
        TransferError::Transient(e.to_string())
    }

    fn status_error(status: StatusCode, path: &str) -> TransferError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                TransferError::Auth(format!("{status} for '{path}'"))
            }
            s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
                TransferError::Transient(format!("{status} for '{path}'"))
            }
            s => TransferError::Client(format!("{s} for '{path}'")),
        }
    }

    fn check_status(resp: &reqwest::Response, path: &str) -> Result<()> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status, path))
        }
    }

    impl super::RemoteStore for ReqwestStore {
        async fn list_version_files(&self, coord: &VersionCoord) -> Result<Vec<RemoteFile>> {
            let url = self.api(&format!(
                "packages/{}/{}/{}/versions/{}/files",
                coord.subject, coord.repo, coord.package, coord.version
            ));
            let resp = self
                .authed(self.client.get(&url))
                .send()
                .await
                .map_err(transport_error)?;
            check_status(&resp, &url)?;
            let body = resp.bytes().await.map_err(transport_error)?;
            serde_json::from_slice::<Vec<RemoteFile>>(&body)
                .map_err(|e| TransferError::Client(format!("bad file listing: {e}")))
        }

        async fn file_size(&self, remote_path: &str) -> Result<u64> {
            let url = self.dl(remote_path);
            let resp = self
                .authed(self.client.head(&url))
                .send()
                .await
                .map_err(transport_error)?;
            check_status(&resp, remote_path)?;
            resp.content_length().ok_or_else(|| {
                TransferError::Client(format!("no content length for '{remote_path}'"))
            })
        }

        async fn fetch(&self, remote_path: &str, range: Option<(u64, u64)>) -> Result<ByteStream> {
            let url = self.dl(remote_path);
            let mut req = self.authed(self.client.get(&url));
            if let Some((start, end)) = range {
                // Half-open [start, end) to an inclusive HTTP byte range.
                req = req.header(reqwest::header::RANGE, format!("bytes={start}-{}", end - 1));
            }
            let resp = req.send().await.map_err(transport_error)?;
            check_status(&resp, remote_path)?;
            let stream = resp
                .bytes_stream()
                .map(|chunk| chunk.map(Bytes::from).map_err(transport_error));
            Ok(Box::pin(stream))
        }

        async fn upload(
            &self,
            remote_path: &str,
            content: ByteStream,
            len: u64,
            flags: UploadFlags,
        ) -> Result<()> {
            let url = self.api(&format!("content/{remote_path}"));
            let resp = self
                .authed(self.client.put(&url))
                .query(&[
                    ("publish", flag(flags.publish)),
                    ("override", flag(flags.override_existing)),
                    ("explode", flag(flags.explode)),
                ])
                .header(reqwest::header::CONTENT_LENGTH, len)
                .body(reqwest::Body::wrap_stream(content))
                .send()
                .await
                .map_err(transport_error)?;
            check_status(&resp, remote_path)
        }
    }

    fn flag(value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestStore;
