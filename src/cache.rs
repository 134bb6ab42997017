//! Best-effort in-process cache for the property list.
//!
//! The distinct property names back both the project-extraction heuristic
//! and the "which project?" question, so they are read on nearly every
//! message. A short TTL keeps the list fresh enough; staleness here is
//! harmless because matching is re-validated against search results.

use crate::models::properties::Property;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug)]
struct CachedList {
    properties: Vec<Property>,
    fetched_at: Instant,
}

#[derive(Debug, Clone)]
pub struct PropertyCache {
    inner: Arc<RwLock<Option<CachedList>>>,
    ttl: Duration,
}

pub const DEFAULT_PROPERTY_TTL: Duration = Duration::from_secs(300);

impl PropertyCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            ttl,
        }
    }

    /// Returns the cached list if it is still within its TTL.
    pub async fn get(&self) -> Option<Vec<Property>> {
        let guard = self.inner.read().await;
        match guard.as_ref() {
            Some(cached) if cached.fetched_at.elapsed() < self.ttl => {
                Some(cached.properties.clone())
            }
            _ => None,
        }
    }

    pub async fn put(&self, properties: Vec<Property>) {
        let mut guard = self.inner.write().await;
        *guard = Some(CachedList {
            properties,
            fetched_at: Instant::now(),
        });
    }
}

impl Default for PropertyCache {
    fn default() -> Self {
        Self::new(DEFAULT_PROPERTY_TTL)
    }
}
