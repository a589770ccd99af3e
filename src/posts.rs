use std::sync::Arc;
use tracing::{error, info, warn};

use crate::comments;
use crate::core::errors::{ApiError, StoreError};
use crate::core::helpers::{new_id, now, validate_uuid};
use crate::engagement::{toggle_like, LikeAction, LikeOutcome};
use crate::models::models::{Post, PostInput, Versioned};
use crate::ownership::{assert_owner, Resource};
use crate::store::PostStore;

/// Result of a transform applied to a freshly read post.
enum Step<T> {
    /// The post was modified and must be saved.
    Commit(T),
    /// Nothing changed; skip the write.
    Unchanged(T),
}

/// Entry point for every post operation. Each mutation is handed to the
/// store as a single `update`, so concurrent writers to one post never
/// overwrite each other.
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// All posts, newest first.
    pub async fn list_posts(&self) -> Result<Vec<Post>, ApiError> {
        let mut posts = self.store.list().await.map_err(storage_error)?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(posts)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, ApiError> {
        Ok(self.lookup(post_id).await?.value)
    }

    pub async fn create_post(&self, caller_id: &str, input: PostInput) -> Result<Post, ApiError> {
        let post = Post {
            id: new_id(),
            text: input.text,
            name: input.name,
            avatar: input.avatar,
            owner: caller_id.to_string(),
            created_at: now(),
            likes: Vec::new(),
            comments: Vec::new(),
        };

        let record = self.store.insert(post).await.map_err(storage_error)?;
        info!(post_id = %record.value.id, owner = %caller_id, "post created");
        Ok(record.value)
    }

    pub async fn delete_post(&self, caller_id: &str, post_id: &str) -> Result<(), ApiError> {
        let post = self.lookup(post_id).await?.value;

        if let Err(err) = assert_owner(Resource::Post, &post.owner, caller_id) {
            warn!(post_id = %post_id, caller = %caller_id, "post delete rejected, not owner");
            return Err(err);
        }

        if !self.store.delete(post_id).await.map_err(storage_error)? {
            return Err(ApiError::PostNotFound);
        }
        info!(post_id = %post_id, owner = %caller_id, "post deleted");
        Ok(())
    }

    /// Adds the caller's like. A second like from the same caller is rejected.
    pub async fn like_post(&self, caller_id: &str, post_id: &str) -> Result<Post, ApiError> {
        let (post, _) = self
            .mutate(post_id, |post| {
                match toggle_like(post, caller_id, LikeAction::Like) {
                    LikeOutcome::AlreadyLiked => Err(ApiError::AlreadyLiked),
                    outcome => Ok(Step::Commit(outcome)),
                }
            })
            .await?;

        info!(post_id = %post_id, caller = %caller_id, likes = post.likes.len(), "post liked");
        Ok(post)
    }

    /// Removes the caller's like. Returns `NotLiked` without writing when
    /// there was no like to remove.
    pub async fn unlike_post(
        &self,
        caller_id: &str,
        post_id: &str,
    ) -> Result<(LikeOutcome, Post), ApiError> {
        let (post, outcome) = self
            .mutate(post_id, |post| {
                let outcome = toggle_like(post, caller_id, LikeAction::Unlike);
                Ok(if outcome.changed() {
                    Step::Commit(outcome)
                } else {
                    Step::Unchanged(outcome)
                })
            })
            .await?;

        if outcome.changed() {
            info!(post_id = %post_id, caller = %caller_id, "post unliked");
        }
        Ok((outcome, post))
    }

    pub async fn add_comment(
        &self,
        caller_id: &str,
        post_id: &str,
        input: PostInput,
    ) -> Result<Post, ApiError> {
        let (post, comment_id) = self
            .mutate(post_id, |post| {
                Ok(Step::Commit(comments::add_comment(post, caller_id, &input)))
            })
            .await?;

        info!(post_id = %post_id, comment_id = %comment_id, owner = %caller_id, "comment added");
        Ok(post)
    }

    pub async fn remove_comment(
        &self,
        caller_id: &str,
        post_id: &str,
        comment_id: &str,
    ) -> Result<Post, ApiError> {
        let result = self
            .mutate(post_id, |post| {
                comments::remove_comment(post, caller_id, comment_id).map(Step::Commit)
            })
            .await;

        match result {
            Ok((post, _)) => {
                info!(post_id = %post_id, comment_id = %comment_id, "comment removed");
                Ok(post)
            }
            Err(ApiError::NotCommentOwner) => {
                warn!(post_id = %post_id, comment_id = %comment_id, caller = %caller_id,
                    "comment delete rejected, not owner");
                Err(ApiError::NotCommentOwner)
            }
            Err(err) => Err(err),
        }
    }

    async fn lookup(&self, post_id: &str) -> Result<Versioned<Post>, ApiError> {
        if !validate_uuid(post_id) {
            return Err(ApiError::PostNotFound);
        }
        self.store
            .find_by_id(post_id)
            .await
            .map_err(storage_error)?
            .ok_or(ApiError::PostNotFound)
    }

    /// Applies `transform` to the current post through `PostStore::update`.
    /// A rejected or no-op transform persists nothing.
    async fn mutate<T, F>(&self, post_id: &str, mut transform: F) -> Result<(Post, T), ApiError>
    where
        F: FnMut(&mut Post) -> Result<Step<T>, ApiError> + Send,
        T: Send,
    {
        if !validate_uuid(post_id) {
            return Err(ApiError::PostNotFound);
        }

        let mut outcome: Option<Result<T, ApiError>> = None;
        let updated = {
            let mut apply = |post: &mut Post| match transform(post) {
                Ok(Step::Commit(result)) => {
                    outcome = Some(Ok(result));
                    true
                }
                Ok(Step::Unchanged(result)) => {
                    outcome = Some(Ok(result));
                    false
                }
                Err(err) => {
                    outcome = Some(Err(err));
                    false
                }
            };
            self.store.update(post_id, &mut apply).await
        };

        let post = match updated {
            Ok(Some(post)) => post,
            Ok(None) => return Err(ApiError::PostNotFound),
            Err(StoreError::Contended { attempts }) => {
                warn!(post_id = %post_id, attempts, "giving up after repeated write conflicts");
                return Err(ApiError::WriteConflict { attempts });
            }
            Err(err) => return Err(storage_error(err)),
        };

        match outcome {
            Some(Ok(result)) => Ok((post, result)),
            Some(Err(err)) => Err(err),
            None => Err(ApiError::PostNotFound),
        }
    }
}

fn storage_error(err: StoreError) -> ApiError {
    if let StoreError::Unavailable(detail) = &err {
        error!(error = %detail, "post store failure");
    }
    err.into()
}
