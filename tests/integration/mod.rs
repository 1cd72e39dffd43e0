//! Integration tests for athena-review.

pub mod athena_test;
pub mod review_test;
pub mod runner_test;
