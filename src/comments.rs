use crate::core::errors::ApiError;
use crate::core::helpers::{new_id, now};
use crate::models::models::{Comment, Post, PostInput};
use crate::ownership::{assert_owner, Resource};

/// Appends a comment owned by `user_id` and returns its id.
pub fn add_comment(post: &mut Post, user_id: &str, input: &PostInput) -> String {
    let comment = Comment {
        id: new_id(),
        text: input.text.clone(),
        name: input.name.clone(),
        avatar: input.avatar.clone(),
        owner: user_id.to_string(),
        created_at: now(),
    };
    let id = comment.id.clone();
    post.comments.push(comment);
    id
}

/// Removes the comment `comment_id` if `user_id` owns it. The post owner has
/// no say over other people's comments.
pub fn remove_comment(post: &mut Post, user_id: &str, comment_id: &str) -> Result<Comment, ApiError> {
    let idx = post
        .comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or(ApiError::CommentNotFound)?;

    assert_owner(Resource::Comment, &post.comments[idx].owner, user_id)?;

    Ok(post.comments.remove(idx))
}
