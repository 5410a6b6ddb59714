//! Execution results and result sets.
//!
//! A statement execution produces either a row-producing result or an update
//! result. Cassandra does not report affected-row counts, so update results
//! carry no count at all.

use crate::error::QueryError;
use crate::transport::protocol::{ColumnInfo, QueryResult, RawRows};
use scylla::value::CqlValue;

/// Update count reported when the cluster gives no count.
pub const UPDATE_COUNT_UNKNOWN: i64 = -1;

/// Text rendered for null cells when the placeholder is enabled.
pub const NULL_PLACEHOLDER: &str = "null";

/// Outcome of one statement execution.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    /// Columns and rows
    Rows(ResultSet),
    /// No queryable content
    Update,
}

impl ExecutionResult {
    /// Classify a transport result.
    pub(crate) fn from_transport(result: QueryResult, null_placeholder: bool) -> Self {
        match result {
            QueryResult::Rows(raw) => Self::Rows(ResultSet::from_raw(raw, null_placeholder)),
            QueryResult::Void => Self::Update,
        }
    }

    /// Check if this result carries rows.
    pub fn is_query(&self) -> bool {
        matches!(self, Self::Rows(_))
    }

    /// Update count; always unknown.
    pub fn update_count(&self) -> i64 {
        UPDATE_COUNT_UNKNOWN
    }

    /// Convert into the result set.
    ///
    /// # Errors
    /// Returns `QueryError::NoResultSet` for update results.
    pub fn into_result_set(self) -> Result<ResultSet, QueryError> {
        match self {
            Self::Rows(result_set) => Ok(result_set),
            Self::Update => Err(QueryError::NoResultSet(
                "Statement did not produce rows".to_string(),
            )),
        }
    }
}

/// Fully fetched rows with a forward-only cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Option<CqlValue>>>,
    /// Index of the current row plus one; 0 is before the first row
    position: usize,
    /// Null cells read as `NULL_PLACEHOLDER`
    null_placeholder: bool,
}

impl ResultSet {
    pub(crate) fn from_raw(raw: RawRows, null_placeholder: bool) -> Self {
        Self {
            columns: raw.columns,
            rows: raw.rows,
            position: 0,
            null_placeholder,
        }
    }

    /// Single-row, single-column text result.
    pub(crate) fn single_text(column: &str, value: &str) -> Self {
        Self::from_raw(
            RawRows {
                columns: vec![ColumnInfo::new(column, "text")],
                rows: vec![vec![Some(CqlValue::Text(value.to_string()))]],
            },
            false,
        )
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Always true; update results never build a result set.
    pub fn is_query(&self) -> bool {
        true
    }

    /// Whether null cells render as the literal placeholder.
    pub fn returns_null_placeholder(&self) -> bool {
        self.null_placeholder
    }

    /// Find a column index by name, ignoring case.
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }

    /// Move to the next row. Returns `false` once past the last row.
    pub fn next_row(&mut self) -> bool {
        if self.position < self.rows.len() {
            self.position += 1;
            true
        } else {
            self.position = self.rows.len() + 1;
            false
        }
    }

    /// All rows, independent of the cursor.
    pub fn rows(&self) -> &[Vec<Option<CqlValue>>] {
        &self.rows
    }

    fn current_row(&self) -> Result<&[Option<CqlValue>], QueryError> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.rows.get(index))
            .map(Vec::as_slice)
            .ok_or_else(|| QueryError::NoResultSet("Cursor is not on a row".to_string()))
    }

    /// Raw value of a column in the current row (0-based).
    pub fn value(&self, index: usize) -> Result<Option<&CqlValue>, QueryError> {
        let row = self.current_row()?;
        row.get(index)
            .map(Option::as_ref)
            .ok_or_else(|| QueryError::NoResultSet(format!("Column index {} out of range", index)))
    }

    /// Column of the current row as text (0-based).
    pub fn get_string(&self, index: usize) -> Result<Option<String>, QueryError> {
        Ok(match self.value(index)? {
            Some(value) => Some(render(value)),
            None if self.null_placeholder => Some(NULL_PLACEHOLDER.to_string()),
            None => None,
        })
    }

    /// Column of the current row as text, by name.
    pub fn get_string_by_name(&self, name: &str) -> Result<Option<String>, QueryError> {
        let index = self
            .find_column(name)
            .ok_or_else(|| QueryError::NoResultSet(format!("No column named '{}'", name)))?;
        self.get_string(index)
    }
}

fn render(value: &CqlValue) -> String {
    match value {
        CqlValue::Ascii(s) | CqlValue::Text(s) => s.clone(),
        CqlValue::Boolean(b) => b.to_string(),
        CqlValue::TinyInt(i) => i.to_string(),
        CqlValue::SmallInt(i) => i.to_string(),
        CqlValue::Int(i) => i.to_string(),
        CqlValue::BigInt(i) | CqlValue::Counter(scylla::value::Counter(i)) => i.to_string(),
        CqlValue::Float(f) => f.to_string(),
        CqlValue::Double(f) => f.to_string(),
        CqlValue::Uuid(u) => u.to_string(),
        CqlValue::Inet(addr) => addr.to_string(),
        other => format!("{:?}", other),
    }
}
