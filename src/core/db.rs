use tracing::info;

use crate::auth::TokenRegistry;
use crate::core::errors::StoreError;
use crate::core::helpers::{new_id, now};
use crate::models::models::Post;
use crate::store::PostStore;

/// Registers fixed `(token, user_id)` pairs for local development.
pub fn register_dev_tokens(registry: &TokenRegistry, pairs: &[(String, String)]) {
    for (token, user_id) in pairs {
        registry.register(token, user_id);
    }
    if !pairs.is_empty() {
        info!(count = pairs.len(), "registered development tokens");
    }
}

/// Inserts a welcome post owned by `owner` unless the store already has posts.
pub async fn init_test_data(store: &dyn PostStore, owner: &str) -> Result<bool, StoreError> {
    if !store.list().await?.is_empty() {
        return Ok(false);
    }

    let post = Post {
        id: new_id(),
        text: "This is the first post on the wall!".to_string(),
        name: owner.to_string(),
        avatar: String::new(),
        owner: owner.to_string(),
        created_at: now(),
        likes: Vec::new(),
        comments: Vec::new(),
    };
    store.insert(post).await?;
    info!(owner = %owner, "seeded welcome post");
    Ok(true)
}
