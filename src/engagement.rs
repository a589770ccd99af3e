use crate::core::helpers::new_id;
use crate::models::models::{Like, Post};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAction {
    Like,
    Unlike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
    /// Like requested by a caller who already likes the post. Nothing changed.
    AlreadyLiked,
    /// Unlike requested by a caller who never liked the post. Nothing changed.
    NotLiked,
}

impl LikeOutcome {
    /// Whether the post was modified and needs persisting.
    pub fn changed(self) -> bool {
        matches!(self, LikeOutcome::Liked | LikeOutcome::Unliked)
    }
}

/// Applies a like or unlike by `user_id` to `post` in place.
pub fn toggle_like(post: &mut Post, user_id: &str, action: LikeAction) -> LikeOutcome {
    let position = post.likes.iter().position(|like| like.user == user_id);

    match (action, position) {
        (LikeAction::Like, Some(_)) => LikeOutcome::AlreadyLiked,
        (LikeAction::Like, None) => {
            post.likes.insert(
                0,
                Like {
                    user: user_id.to_string(),
                    id: new_id(),
                },
            );
            LikeOutcome::Liked
        }
        (LikeAction::Unlike, Some(idx)) => {
            post.likes.remove(idx);
            LikeOutcome::Unliked
        }
        (LikeAction::Unlike, None) => LikeOutcome::NotLiked,
    }
}
