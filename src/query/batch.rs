//! Batch accumulation.

use crate::error::QueryError;
use crate::query::executor::Executor;
use crate::transport::protocol::BatchEntry;
use tracing::debug;

/// Per-statement outcome of a successful batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// Applied; the cluster reports no per-statement count
    SuccessNoInfo,
}

impl BatchStatus {
    /// Numeric status code understood by relational tooling.
    pub fn code(&self) -> i32 {
        match self {
            BatchStatus::SuccessNoInfo => -2,
        }
    }
}

/// Statements waiting to run as one logged batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    entries: Vec<BatchEntry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: BatchEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }
}

/// Append to the pending batch, creating it on first use.
pub(crate) fn add_pending(pending: &mut Option<Batch>, entry: BatchEntry) {
    pending.get_or_insert_with(Batch::new).add(entry);
}

/// Run and clear the pending batch.
///
/// The batch is consumed before it is submitted, so it is gone whether the
/// cluster accepts it or not.
pub(crate) fn execute_pending(
    pending: &mut Option<Batch>,
    executor: &Executor,
) -> Result<Vec<BatchStatus>, QueryError> {
    let batch = pending
        .take()
        .filter(|batch| !batch.is_empty())
        .ok_or(QueryError::NoBatchStatements)?;

    debug!(size = batch.len(), "executing batch");
    executor.execute_batch(batch.entries())?;
    Ok(vec![BatchStatus::SuccessNoInfo; batch.len()])
}
