//! Query execution for athena-review.
//!
//! This module holds the runner that drives queries through the service,
//! along with its polling schedule, listeners, result streaming, tables and
//! the caller-owned result cache.

pub mod cache;
pub mod listeners;
pub mod rows;
pub mod runner;
pub mod schedule;
pub mod summary;
pub mod table;

pub use cache::ResultCache;
pub use listeners::{
    AuditLogListener, ListenerError, ListenerFailurePolicy, ListenerRegistry, QueryListener,
};
pub use runner::QueryRunner;
pub use summary::format_bytes;
pub use table::ResultTable;
