//! Entity search collaborator
//!
//! This module defines the `EntitySearch` trait the resolver input calls to
//! turn a free-text query into candidate entities. Implementations must be
//! safe to call repeatedly and concurrently; the resolver never serializes
//! calls and orders results itself by request token.

use async_trait::async_trait;
use oj_types::Entity;

/// Errors a search collaborator can report
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Request(String),
    #[error("Search returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode search response: {0}")]
    Decode(String),
    #[error("Search unavailable: {0}")]
    Unavailable(String),
}

/// Resolves candidate entities for a query within an optional category.
///
/// Returns candidates in relevance order; callers must not re-sort.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait EntitySearch: MaybeSend + MaybeSync {
    async fn search(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Entity>, SearchError>;
}

// Fetch tasks run on tokio worker threads natively but on the single JS
// thread in the browser, where reqwest futures are not Send.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + ?Sized> MaybeSend for T {}
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSync: Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Sync + ?Sized> MaybeSync for T {}

#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSend for T {}
#[cfg(target_arch = "wasm32")]
pub trait MaybeSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSync for T {}

// =============================================================================
// IN-PROCESS SEARCH
// =============================================================================

/// Search over a fixed list of entities.
///
/// Matches case-insensitively on label or id, keeps insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntitySearch {
    entities: Vec<Entity>,
    limit: Option<usize>,
}

impl InMemoryEntitySearch {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn matches(entity: &Entity, category: Option<&str>, needle: Option<&str>) -> bool {
        if let Some(category) = category {
            if entity.category.as_deref() != Some(category) {
                return false;
            }
        }
        match needle {
            None => true,
            Some(needle) => {
                entity.display_label().to_lowercase().contains(needle)
                    || entity.id.to_string().to_lowercase().contains(needle)
            }
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl EntitySearch for InMemoryEntitySearch {
    async fn search(
        &self,
        category: Option<&str>,
        query: Option<&str>,
    ) -> Result<Vec<Entity>, SearchError> {
        let needle = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let matched = self
            .entities
            .iter()
            .filter(|entity| Self::matches(entity, category, needle.as_deref()))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matched)
    }
}
