//! Submission listeners.
//!
//! Listeners are registered on a `ListenerRegistry` that is handed to the
//! runner at construction and invoked synchronously with the query text
//! once the service has accepted the query.

use crate::athena::QueryHandle;
use crate::error::{Result, ReviewError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Error type listeners report failures with.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Observer notified when a query is submitted.
pub trait QueryListener: Send + Sync {
    fn on_submit(&self, query: &str) -> std::result::Result<(), ListenerError>;
}

impl<F> QueryListener for F
where
    F: Fn(&str) -> std::result::Result<(), ListenerError> + Send + Sync,
{
    fn on_submit(&self, query: &str) -> std::result::Result<(), ListenerError> {
        self(query)
    }
}

/// What happens when a listener fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListenerFailurePolicy {
    /// Stop at the first failure and return it to the caller.
    #[default]
    Propagate,
    /// Log the failure and keep going.
    Isolate,
}

/// Ordered set of listeners plus the failure policy applied to them.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn QueryListener>>,
    policy: ListenerFailurePolicy,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ListenerFailurePolicy) -> Self {
        Self {
            listeners: Vec::new(),
            policy,
        }
    }

    /// Adds a listener. Listeners run in registration order.
    pub fn register(&mut self, listener: impl QueryListener + 'static) {
        self.listeners.push(Arc::new(listener));
    }

    /// Adds a closure listener.
    pub fn register_fn<F>(&mut self, listener: F)
    where
        F: Fn(&str) -> std::result::Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.register(listener);
    }

    /// Invokes every listener with the submitted query text.
    pub fn notify(&self, handle: &QueryHandle, query: &str) -> Result<()> {
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(e) = listener.on_submit(query) {
                match self.policy {
                    ListenerFailurePolicy::Propagate => {
                        return Err(ReviewError::listener(handle.id(), e.to_string()));
                    }
                    ListenerFailurePolicy::Isolate => {
                        warn!("Listener {} failed for query {}: {}", index, handle, e);
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Listener that writes every submitted query to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLogListener;

impl QueryListener for AuditLogListener {
    fn on_submit(&self, query: &str) -> std::result::Result<(), ListenerError> {
        info!(target: "athena_review::audit", query = %query.trim(), "query submitted");
        Ok(())
    }
}
