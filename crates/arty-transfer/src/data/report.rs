use super::job::{Outcome, TransferResult};

/// Aggregate of every job's terminal result for one invocation.
///
/// Output order follows worker completion, not submission order. Partial
/// application stands: files already committed are not rolled back when a
/// sibling job fails.
#[derive(Clone, Debug, Default)]
pub struct TransferReport {
    pub results: Vec<TransferResult>,
}

impl TransferReport {
    pub fn push(&mut self, result: TransferResult) {
        self.results.push(result);
    }

    /// No files matched the pattern. Surfaced as a warning, not a failure.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Succeeded))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn total_bytes(&self) -> u64 {
        self.results.iter().map(|r| r.bytes).sum()
    }

    /// True iff no job ended `Failed`. Skipped jobs (dry run) count as
    /// success.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}
