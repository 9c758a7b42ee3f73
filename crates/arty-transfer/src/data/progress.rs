/// Stages a download moves through, in order. Retries return to `Fetching`;
/// `Failed` is reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferStage {
    /// Ranges planned, nothing enqueued yet.
    #[default]
    Planned,
    /// Range (or whole-file) requests in flight.
    Fetching,
    /// Writing completed ranges into the target at their offsets.
    Merging,
    /// Final size checked against the expected size.
    Verified,
    /// Committed to the resolved target path.
    Complete,
    Failed,
}

impl std::fmt::Display for TransferStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStage::Planned => write!(f, "Planned"),
            TransferStage::Fetching => write!(f, "Fetching"),
            TransferStage::Merging => write!(f, "Merging"),
            TransferStage::Verified => write!(f, "Verified"),
            TransferStage::Complete => write!(f, "Complete"),
            TransferStage::Failed => write!(f, "Failed"),
        }
    }
}

/// Progress event delivered to the invocation's callback.
///
/// `bytes_delta` is the increment since the previous event for the same
/// file, so an aggregate tracker can simply add it.
#[derive(Clone, Debug)]
pub struct Progress {
    pub path: String,
    pub stage: TransferStage,
    pub bytes_delta: u64,
    pub total_bytes: Option<u64>,
}
