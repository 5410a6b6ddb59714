//! Per-connection state shared with every statement a connection creates.

use crate::error::ConnectionError;
use crate::types::ConsistencyLevel;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};

/// Mutable state of one connection.
///
/// Shared behind an `Arc` by the connection and all of its statements. The
/// current consistency level is a single value: a meta-command on one
/// statement changes it for every statement of the connection. Callers that
/// change the level from one thread while preparing statements on another
/// must synchronize themselves; prepared statements snapshot the level when
/// they are prepared.
#[derive(Debug)]
pub struct SessionState {
    /// Current consistency level, stored as an index into `ConsistencyLevel::ALL`
    consistency: AtomicU8,
    /// Set once by close
    closed: AtomicBool,
    /// Observational only
    read_only: AtomicBool,
    /// Statements dispatched to the cluster
    query_count: AtomicU64,
    /// Legacy introspection query renders null text as a placeholder
    return_null_strings_from_intro_query: bool,
}

impl SessionState {
    /// Create open state with the configured initial level.
    pub fn new(consistency: ConsistencyLevel, return_null_strings_from_intro_query: bool) -> Self {
        Self {
            consistency: AtomicU8::new(consistency.as_index()),
            closed: AtomicBool::new(false),
            read_only: AtomicBool::new(false),
            query_count: AtomicU64::new(0),
            return_null_strings_from_intro_query,
        }
    }

    /// Current consistency level.
    pub fn consistency_level(&self) -> ConsistencyLevel {
        ConsistencyLevel::from_index(self.consistency.load(Ordering::SeqCst))
    }

    /// Replace the current consistency level.
    pub fn set_consistency_level(&self, level: ConsistencyLevel) {
        self.consistency.store(level.as_index(), Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Mark the state closed.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn mark_closed(&self) -> bool {
        self.closed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Fail fast once closed.
    pub fn ensure_open(&self) -> Result<(), ConnectionError> {
        if self.is_closed() {
            Err(ConnectionError::ConnectionClosed)
        } else {
            Ok(())
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Increment the dispatched statement counter.
    pub fn increment_query_count(&self) -> u64 {
        self.query_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn query_count(&self) -> u64 {
        self.query_count.load(Ordering::SeqCst)
    }

    pub fn return_null_strings_from_intro_query(&self) -> bool {
        self.return_null_strings_from_intro_query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_initial_state() {
        let state = SessionState::new(ConsistencyLevel::Serial, false);
        assert_eq!(state.consistency_level(), ConsistencyLevel::Serial);
        assert!(!state.is_closed());
        assert!(!state.is_read_only());
        assert_eq!(state.query_count(), 0);
        assert!(state.ensure_open().is_ok());
    }

    #[test]
    fn test_consistency_level_is_shared() {
        let state = Arc::new(SessionState::new(ConsistencyLevel::LocalOne, false));
        let other = Arc::clone(&state);
        other.set_consistency_level(ConsistencyLevel::Quorum);
        assert_eq!(state.consistency_level(), ConsistencyLevel::Quorum);
    }

    #[test]
    fn test_mark_closed_transitions_once() {
        let state = SessionState::new(ConsistencyLevel::LocalOne, false);
        assert!(state.mark_closed());
        assert!(!state.mark_closed());
        assert!(state.is_closed());
        assert!(matches!(
            state.ensure_open(),
            Err(ConnectionError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_read_only_is_stored() {
        let state = SessionState::new(ConsistencyLevel::LocalOne, false);
        state.set_read_only(true);
        assert!(state.is_read_only());
    }

    #[test]
    fn test_query_count() {
        let state = SessionState::new(ConsistencyLevel::LocalOne, true);
        assert_eq!(state.increment_query_count(), 1);
        assert_eq!(state.increment_query_count(), 2);
        assert_eq!(state.query_count(), 2);
        assert!(state.return_null_strings_from_intro_query());
    }
}
