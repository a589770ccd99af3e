use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Stable classification of every failure a request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unauthenticated,
    NotFound,
    Forbidden,
    Conflict,
    Unavailable,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid input: {0:?}")]
    InvalidInput(BTreeMap<String, String>),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("post not found")]
    PostNotFound,

    #[error("comment not found")]
    CommentNotFound,

    #[error("no posts found")]
    NoPosts,

    #[error("caller does not own the post")]
    NotPostOwner,

    #[error("caller does not own the comment")]
    NotCommentOwner,

    #[error("post already liked by caller")]
    AlreadyLiked,

    #[error("write conflict after {attempts} attempts")]
    WriteConflict { attempts: usize },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    pub fn invalid_field(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.to_string());
        ApiError::InvalidInput(errors)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::InvalidInput(_) => ErrorKind::InvalidInput,
            ApiError::Unauthenticated => ErrorKind::Unauthenticated,
            ApiError::PostNotFound | ApiError::CommentNotFound | ApiError::NoPosts => {
                ErrorKind::NotFound
            }
            ApiError::NotPostOwner | ApiError::NotCommentOwner => ErrorKind::Forbidden,
            ApiError::AlreadyLiked | ApiError::WriteConflict { .. } => ErrorKind::Conflict,
            ApiError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    /// JSON body sent to the client. Never carries internal detail.
    pub fn body(&self) -> serde_json::Value {
        match self {
            ApiError::InvalidInput(errors) => serde_json::json!(errors),
            ApiError::Unauthenticated => serde_json::json!({"unauthorized": "Unauthorized"}),
            ApiError::PostNotFound => serde_json::json!({"postnotfound": "No post found"}),
            ApiError::CommentNotFound => {
                serde_json::json!({"commentnotexists": "Comment does not exist"})
            }
            ApiError::NoPosts => serde_json::json!({"nopostsfound": "No posts found"}),
            ApiError::NotPostOwner => serde_json::json!({"notauthorized": "User not authorized"}),
            ApiError::NotCommentOwner => {
                serde_json::json!({"notauthorized": "You are not the owner of the comment"})
            }
            ApiError::AlreadyLiked => {
                serde_json::json!({"alreadyliked": "User already liked this post"})
            }
            ApiError::WriteConflict { .. } => {
                serde_json::json!({"conflict": "Post was modified concurrently, try again"})
            }
            ApiError::Unavailable(_) => {
                serde_json::json!({"unavailable": "Service temporarily unavailable"})
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::AlreadyLiked => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated | ApiError::NotPostOwner | ApiError::NotCommentOwner => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::PostNotFound | ApiError::CommentNotFound | ApiError::NoPosts => {
                StatusCode::NOT_FOUND
            }
            ApiError::WriteConflict { .. } => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Failures surfaced by a `PostStore`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },

    #[error("gave up after {attempts} conflicting writes")]
    Contended { attempts: usize },

    #[error("record {0} no longer exists")]
    Missing(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Missing(_) => ApiError::PostNotFound,
            StoreError::VersionConflict { .. } => ApiError::WriteConflict { attempts: 1 },
            StoreError::Contended { attempts } => ApiError::WriteConflict { attempts },
            StoreError::Unavailable(detail) => ApiError::Unavailable(detail),
        }
    }
}
