use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::auth::{Caller, IdentityResolver};
use crate::core::errors::ApiError;
use crate::core::validation::validate_post_input;
use crate::engagement::LikeOutcome;
use crate::posts::PostService;

/// Collaborators shared by every request.
pub struct AppState {
    pub posts: Arc<PostService>,
    pub identities: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(posts: Arc<PostService>, identities: Arc<dyn IdentityResolver>) -> Self {
        Self { posts, identities }
    }
}

/// Registers the post routes. `/posts/test` goes before `/posts/{post_id}`
/// so the id pattern does not swallow it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/posts/test").route(web::get().to(test_route)))
        .service(
            web::resource("/posts")
                .route(web::get().to(list_posts))
                .route(web::post().to(create_post)),
        )
        .service(web::resource("/posts/like/{post_id}").route(web::post().to(like_post)))
        .service(web::resource("/posts/unlike/{post_id}").route(web::post().to(unlike_post)))
        .service(web::resource("/posts/comment/{post_id}").route(web::post().to(add_comment)))
        .service(
            web::resource("/posts/comment/{post_id}/{comment_id}")
                .route(web::delete().to(remove_comment)),
        )
        .service(
            web::resource("/posts/{post_id}")
                .route(web::get().to(get_post))
                .route(web::delete().to(delete_post)),
        );
}

fn parse_body(body: &[u8]) -> Result<serde_json::Value, ApiError> {
    serde_json::from_slice(body)
        .map_err(|_| ApiError::invalid_field("body", "Request body must be valid JSON"))
}

fn success() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"success": true}))
}

async fn test_route() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"test": "posts works"}))
}

async fn list_posts(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    match state.posts.list_posts().await {
        Ok(posts) => Ok(HttpResponse::Ok().json(posts)),
        Err(ApiError::Unavailable(_)) => Err(ApiError::NoPosts),
        Err(err) => Err(err),
    }
}

async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post = state.posts.get_post(&path).await?;
    Ok(HttpResponse::Ok().json(post))
}

async fn create_post(
    state: web::Data<AppState>,
    caller: Caller,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input = validate_post_input(&parse_body(&body)?)?;
    let post = state.posts.create_post(&caller.user_id, input).await?;
    Ok(HttpResponse::Ok().json(post))
}

async fn delete_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.posts.delete_post(&caller.user_id, &path).await?;
    Ok(success())
}

async fn like_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let post = state.posts.like_post(&caller.user_id, &path).await?;
    Ok(HttpResponse::Ok().json(post))
}

async fn unlike_post(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let (outcome, _) = state.posts.unlike_post(&caller.user_id, &path).await?;
    Ok(match outcome {
        LikeOutcome::NotLiked => HttpResponse::Ok()
            .json(serde_json::json!({"notlikes": "You have not yet liked this post"})),
        _ => success(),
    })
}

async fn add_comment(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let input = validate_post_input(&parse_body(&body)?)?;
    state.posts.add_comment(&caller.user_id, &path, input).await?;
    Ok(success())
}

async fn remove_comment(
    state: web::Data<AppState>,
    caller: Caller,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (post_id, comment_id) = path.into_inner();
    let post = state
        .posts
        .remove_comment(&caller.user_id, &post_id, &comment_id)
        .await?;
    Ok(HttpResponse::Ok().json(post))
}
