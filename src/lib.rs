pub mod auth;
pub mod comments;
pub mod config;
pub mod core;
pub mod engagement;
pub mod handlers;
pub mod models;
pub mod ownership;
pub mod posts;
pub mod store;

pub use handlers::{configure, AppState};
