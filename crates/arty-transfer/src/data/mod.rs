//! Immutable configuration and types shared across the engine.

mod config;
mod coord;
mod job;
mod pattern;
mod progress;
mod report;

pub use config::{EngineConfig, RepoContext};
pub use coord::{FilePath, VersionCoord};
pub use job::{FailureKind, JobKind, Outcome, TransferJob, TransferResult};
pub use pattern::PathPattern;
pub use progress::{Progress, TransferStage};
pub use report::TransferReport;
