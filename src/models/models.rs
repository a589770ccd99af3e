use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    /// Most recent first. At most one entry per user.
    pub likes: Vec<Like>,
    /// Append order.
    pub comments: Vec<Comment>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Like {
    pub user: String,
    pub id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
}

/// Validated `{text, name, avatar}` body shared by posts and comments.
#[derive(Clone, Debug, PartialEq)]
pub struct PostInput {
    pub text: String,
    pub name: String,
    pub avatar: String,
}

/// A stored post together with the version it was read at.
#[derive(Clone, Debug)]
pub struct Versioned<T> {
    pub version: u64,
    pub value: T,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TokenData {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    pub fn liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|like| like.user == user_id)
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}
