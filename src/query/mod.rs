//! Statement execution and result handling.
//!
//! # Overview
//!
//! The query module is organized into:
//! - `executor` - the pipeline shared by every statement of a connection
//! - `meta` - client-side `CONSISTENCY` commands
//! - `statement` - plain text execution and text batches
//! - `prepared` - prepared statements with bind parameters
//! - `batch` - pending batch accumulation
//! - `results` - result sets handed to callers
//!
//! # Example
//!
//! ```no_run
//! use cassandra_dbc::Driver;
//!
//! # fn example() -> Result<(), cassandra_dbc::DriverError> {
//! let connection = Driver::new().connect("jdbc:cassandra://localhost/shop", None)?;
//! let mut stmt = connection.create_statement()?;
//!
//! stmt.execute("CONSISTENCY QUORUM")?;
//! stmt.execute("SELECT id, total FROM orders")?;
//! if let Some(rows) = stmt.result_mut() {
//!     while rows.next_row() {
//!         println!("{:?}", rows.get_string(0)?);
//!     }
//! }
//!
//! stmt.add_batch("INSERT INTO orders (id, total) VALUES (1, 10)")?;
//! stmt.add_batch("INSERT INTO orders (id, total) VALUES (2, 20)")?;
//! stmt.execute_batch()?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod executor;
pub mod meta;
pub mod prepared;
pub mod results;
pub mod statement;

pub use batch::{Batch, BatchStatus};
pub use executor::Executor;
pub use meta::{MetaCommand, CONSISTENCY_COLUMN};
pub use prepared::{PreparedStatement, INTRO_QUERY};
pub use results::{ExecutionResult, ResultSet, NULL_PLACEHOLDER, UPDATE_COUNT_UNKNOWN};
pub use statement::Statement;
