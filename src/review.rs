//! Review sessions.
//!
//! A `ReviewSession` loads the reviewed view once, keeps the result in a
//! cache it owns, and serves it until the caller asks for a refresh. Every
//! loaded table gets an empty annotation column for the operator's notes.

use crate::config::{AthenaConfig, ReviewConfig};
use crate::error::{Result, ReviewError};
use crate::query::{QueryRunner, ResultCache, ResultTable};
use tracing::info;

/// Loads and caches the result set under review.
pub struct ReviewSession {
    runner: QueryRunner,
    athena: AthenaConfig,
    review: ReviewConfig,
    cache: ResultCache<ResultTable>,
}

impl ReviewSession {
    /// Creates a session. The cache honours `review.cache_ttl_secs`.
    pub fn new(runner: QueryRunner, athena: AthenaConfig, review: ReviewConfig) -> Self {
        let cache = match review.cache_ttl() {
            Some(ttl) => ResultCache::with_ttl(ttl),
            None => ResultCache::new(),
        };
        Self {
            runner,
            athena,
            review,
            cache,
        }
    }

    /// Returns the query that loads the reviewed view.
    ///
    /// A bare view name is qualified with the configured database.
    pub fn review_query(&self) -> Result<String> {
        let view = self.review.view.as_deref().ok_or_else(|| {
            ReviewError::config("No view to review. Set review.view or pass a query")
        })?;

        if view.contains('.') {
            Ok(format!("SELECT * FROM {view}"))
        } else {
            Ok(format!("SELECT * FROM {}.{}", self.athena.database(), view))
        }
    }

    /// Returns the reviewed table, running the query on a cache miss or
    /// when `refresh` is set.
    pub async fn load(&mut self, refresh: bool) -> Result<ResultTable> {
        let query = self.review_query()?;
        self.load_query(&query, refresh).await
    }

    /// Like `load`, for an arbitrary query.
    pub async fn load_query(&mut self, query: &str, refresh: bool) -> Result<ResultTable> {
        if refresh && self.cache.invalidate(query) {
            info!("Refreshing cached result");
        }

        let request = self.athena.request(query)?;
        let runner = &self.runner;
        let annotation_column = self.review.annotation_column.clone();

        self.cache
            .get_or_load(query, || async move {
                let mut table = runner.query_table(&request).await?;
                table.add_column(annotation_column, Some(String::new()));
                Ok(table)
            })
            .await
    }

    /// Drops every cached result.
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }
}
