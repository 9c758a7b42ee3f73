//! Bulk transfer engine for a binary-artifact hosting service.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - [`data`] - Immutable configuration and types
//! - [`core`] - Pure transformations (range planning, pattern translation, path resolution)
//! - [`effects`] - I/O operations with trait abstraction
//!
//! # Key Features
//!
//! - **Pattern Discovery**: wildcard or regex expressions resolve to local files
//!   for upload or remote entries for download
//! - **Split Downloads**: large files are fetched as parallel byte ranges and
//!   reassembled deterministically by offset
//! - **Bounded Pool**: a fixed number of workers drain one FIFO queue, so at
//!   most `threads` network operations are ever in flight
//! - **Uniform Retry**: every network unit runs under the same bounded retry
//!   with failure classification; per-job failures never abort sibling jobs

pub mod core;
pub mod data;
pub mod effects;
mod error;

pub use data::{
    EngineConfig, FailureKind, FilePath, JobKind, Outcome, PathPattern, Progress, RepoContext,
    TransferJob, TransferReport, TransferResult, TransferStage, VersionCoord,
};
pub use effects::{BoxStream, ByteStream, ProgressFn, RemoteFile, RemoteStore, TransferEngine, UploadFlags};

#[cfg(feature = "reqwest")]
pub use effects::ReqwestStore;

pub use error::{Result, TransferError};
