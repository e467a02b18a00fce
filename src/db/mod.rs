//! Database module: the per-call SQLite executor and the fixed sample data.
//!
//! Layout:
//! - `executor.rs`: `Database` handle with `query`, `exec`, `run_in_transaction`
//! - `row.rs`: SQLite rows to JSON objects
//! - `catalog.rs`: table and column introspection
//! - `sample_data.rs`: the e-commerce seed batches

pub mod catalog;
pub mod executor;
pub mod row;
pub mod sample_data;

pub use catalog::ColumnInfo;
pub use executor::{Database, ExecOutcome};
pub use row::Row;
pub use sample_data::{SAMPLE_DATA_STATEMENTS, StepOutcome, load_sample_data};
