//! Routing collaborator: turns a pair of addresses into a driving distance and duration.

mod mapy;

pub use mapy::{MapyClient, MapySettings};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One-way leg as reported by the routing service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("routing service is not configured: {0}")]
    NotConfigured(String),
    #[error("address '{0}' could not be geocoded")]
    AddressNotFound(String),
    #[error("no route found between '{start}' and '{end}'")]
    NoRoute { start: String, end: String },
    #[error("routing request failed: {0}")]
    Transport(String),
    #[error("routing response was malformed: {0}")]
    InvalidResponse(String),
}

/// Blocking lookup with a bounded timeout; callers on an async runtime must move the call
/// onto a blocking thread.
pub trait RouteProvider: Debug + Send + Sync {
    fn route(&self, start: &str, end: &str) -> Result<RouteLeg, RouteError>;
}
