//! Client-side meta-commands.
//!
//! Statement text such as `CONSISTENCY QUORUM` is interpreted by the driver
//! and never reaches the cluster. Interceptors are tried in a fixed order and
//! the first one whose pattern matches the whole trimmed text wins.

use crate::connection::session::SessionState;
use crate::error::QueryError;
use crate::query::results::{ExecutionResult, ResultSet};
use crate::types::ConsistencyLevel;
use tracing::debug;

/// Column name of the `CONSISTENCY` result.
pub const CONSISTENCY_COLUMN: &str = "consistency_level";

const KEYWORD: &str = "CONSISTENCY";

/// Statement text handled by the driver itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    /// `CONSISTENCY <LEVEL>`
    SetConsistency,
    /// `CONSISTENCY`
    GetConsistency,
}

impl MetaCommand {
    /// Interceptors in priority order.
    pub const CHAIN: [MetaCommand; 2] = [MetaCommand::SetConsistency, MetaCommand::GetConsistency];

    /// Run this interceptor against statement text.
    ///
    /// Returns `None` when the text does not match.
    pub fn try_execute(
        &self,
        cql: &str,
        state: &SessionState,
    ) -> Option<Result<ExecutionResult, QueryError>> {
        let mut words = cql.split_whitespace();
        if !words.next()?.eq_ignore_ascii_case(KEYWORD) {
            return None;
        }
        let argument = words.next();
        if words.next().is_some() {
            return None;
        }

        match (self, argument) {
            (MetaCommand::SetConsistency, Some(level)) if is_word(level) => {
                Some(set_consistency(level, state))
            }
            (MetaCommand::GetConsistency, None) => {
                let level = state.consistency_level();
                debug!(%level, "read consistency level");
                Some(Ok(ExecutionResult::Rows(ResultSet::single_text(
                    CONSISTENCY_COLUMN,
                    level.name(),
                ))))
            }
            _ => None,
        }
    }
}

/// Try every interceptor in order.
pub fn intercept(cql: &str, state: &SessionState) -> Option<Result<ExecutionResult, QueryError>> {
    MetaCommand::CHAIN
        .iter()
        .find_map(|command| command.try_execute(cql, state))
}

fn set_consistency(level: &str, state: &SessionState) -> Result<ExecutionResult, QueryError> {
    // Unlike connection strings, an unknown level here is an error
    let level = level
        .parse::<ConsistencyLevel>()
        .map_err(QueryError::ExecutionFailed)?;
    state.set_consistency_level(level);
    debug!(%level, "changed consistency level");
    Ok(ExecutionResult::Update)
}

fn is_word(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
