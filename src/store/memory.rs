use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::core::errors::StoreError;
use crate::models::models::{Post, Versioned};
use crate::store::{Mutator, PostStore};

/// Process-local store. `save` checks the version and writes under one write
/// lock, and `update` runs the whole mutation under that lock, so neither can
/// lose a concurrent write.
#[derive(Default)]
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<String, Versioned<Post>>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let posts = self.posts.read().await;
        Ok(posts.values().map(|record| record.value.clone()).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Versioned<Post>>, StoreError> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Versioned<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        if let Some(existing) = posts.get(&post.id) {
            return Err(StoreError::VersionConflict {
                expected: 0,
                found: existing.version,
            });
        }
        let record = Versioned {
            version: 1,
            value: post,
        };
        posts.insert(record.value.id.clone(), record.clone());
        Ok(record)
    }

    async fn save(&self, post: Post, expected_version: u64) -> Result<u64, StoreError> {
        let mut posts = self.posts.write().await;
        let record = posts
            .get_mut(&post.id)
            .ok_or_else(|| StoreError::Missing(post.id.clone()))?;

        if record.version != expected_version {
            return Err(StoreError::VersionConflict {
                expected: expected_version,
                found: record.version,
            });
        }

        record.version += 1;
        record.value = post;
        Ok(record.version)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.posts.write().await.remove(id).is_some())
    }

    async fn update(&self, id: &str, mutator: &mut Mutator<'_>) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(record) = posts.get_mut(id) else {
            return Ok(None);
        };

        let mut candidate = record.value.clone();
        if !mutator(&mut candidate) {
            return Ok(Some(record.value.clone()));
        }

        record.version += 1;
        record.value = candidate.clone();
        Ok(Some(candidate))
    }
}
