//! Persistence boundary for posts.
//!
//! Records are versioned: every successful `insert`, `save` or committed
//! `update` bumps the version, and `save` only succeeds when the caller
//! presents the version it read. `update` applies a mutation to the current
//! record as one store-level step; stores without a native atomic update fall
//! back to `optimistic_update`, a version-checked retry loop with jittered
//! backoff.

use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

use crate::config::max_write_retries;
use crate::core::errors::StoreError;
use crate::models::models::{Post, Versioned};

pub mod memory;

pub use memory::InMemoryPostStore;

/// Mutation applied by `update`. Returns `true` when the changed post must be
/// committed, `false` to leave the stored record untouched.
pub type Mutator<'a> = dyn FnMut(&mut Post) -> bool + Send + 'a;

const BACKOFF_BASE_MS: u64 = 2;
const BACKOFF_CAP_MS: u64 = 100;

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every stored post, in no particular order.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Versioned<Post>>, StoreError>;

    /// Stores a new post at version 1.
    async fn insert(&self, post: Post) -> Result<Versioned<Post>, StoreError>;

    /// Replaces the stored post iff its version still equals `expected_version`.
    /// Returns the new version.
    async fn save(&self, post: Post, expected_version: u64) -> Result<u64, StoreError>;

    /// Returns `false` when there was nothing to delete.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Runs `mutator` against the current record and commits the result if it
    /// asks to. Returns the stored post afterwards, or `None` if there is no
    /// record with that id.
    async fn update(&self, id: &str, mutator: &mut Mutator<'_>) -> Result<Option<Post>, StoreError> {
        optimistic_update(self, id, mutator, max_write_retries()).await
    }
}

/// Read, mutate and version-checked save, re-running the cycle against a fresh
/// snapshot after every lost race, up to `max_attempts` times.
pub async fn optimistic_update<S: PostStore + ?Sized>(
    store: &S,
    id: &str,
    mutator: &mut Mutator<'_>,
    max_attempts: usize,
) -> Result<Option<Post>, StoreError> {
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let Some(Versioned { version, value }) = store.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut candidate = value.clone();
        if !mutator(&mut candidate) {
            return Ok(Some(value));
        }

        match store.save(candidate.clone(), version).await {
            Ok(_) => return Ok(Some(candidate)),
            Err(StoreError::VersionConflict { expected, found }) => {
                debug!(post_id = %id, attempt, expected, found, "write lost a race, retrying");
                if attempt < max_attempts {
                    tokio::time::sleep(backoff(attempt)).await;
                }
            }
            Err(err) => return Err(err),
        }
    }

    Err(StoreError::Contended {
        attempts: max_attempts,
    })
}

/// Full-jitter exponential backoff.
fn backoff(attempt: usize) -> Duration {
    let shift = attempt.min(16) as u32;
    let ceiling = BACKOFF_BASE_MS.saturating_mul(1 << shift).min(BACKOFF_CAP_MS);
    Duration::from_millis(rand::thread_rng().gen_range(0..=ceiling))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_stays_under_cap() {
        for attempt in 1..40 {
            assert!(backoff(attempt) <= Duration::from_millis(BACKOFF_CAP_MS));
        }
    }
}
