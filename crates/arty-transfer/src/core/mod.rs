//! Pure transformations: no I/O, deterministic for identical inputs.

mod pattern;
mod plan;
mod resolve;
mod retry;

pub use pattern::{CompiledPattern, split_wildcard_root, wildcard_to_regex};
pub use plan::{RangePlan, RangeSpec, plan_ranges};
pub use resolve::{download_target, upload_target};
pub use retry::retry_delay;
