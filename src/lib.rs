//! Deterministic SQL stress-test generator.
//!
//! Produces synthetic datasets and matching SQL scripts with precomputed
//! expected results, used to validate a database engine under
//! insert/update/delete workloads at varying scale and ordering. For a
//! fixed seed, two independent runs are byte-for-byte identical.

pub mod dataset;
pub mod emitter;
pub mod error;
pub mod rows;
pub mod scenario;
pub mod schema;
pub mod value;

pub use error::GenError;
pub use rows::{OrderMode, RowComposer};
pub use schema::{Column, ColumnType, FlagRate, LogicalTable, Schema, TableVariant};
pub use value::{SqlValue, ValueGen};
