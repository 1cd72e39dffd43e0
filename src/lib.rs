//! athena-review - run Athena queries and load their results for review.
//!
//! This library exposes the core modules for use by the binary and the
//! integration tests.

pub mod athena;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
pub mod review;
