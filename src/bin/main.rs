use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use postwall::auth::TokenRegistry;
use postwall::config;
use postwall::core::db::{init_test_data, register_dev_tokens};
use postwall::posts::PostService;
use postwall::store::{InMemoryPostStore, PostStore};
use postwall::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("postwall=info,actix_web=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let store: Arc<dyn PostStore> = Arc::new(InMemoryPostStore::new());
    let registry = Arc::new(TokenRegistry::default());

    let dev_tokens = config::dev_tokens();
    register_dev_tokens(&registry, &dev_tokens);

    if config::seed_posts() {
        if let Some((_, owner)) = dev_tokens.first() {
            init_test_data(store.as_ref(), owner)
                .await
                .context("failed to seed posts")?;
        }
    }

    let state = web::Data::new(AppState::new(
        Arc::new(PostService::new(store)),
        registry,
    ));
    let prefix = config::api_prefix();
    let addr = config::bind_addr();

    info!(addr = %addr, prefix = %prefix, "server listening");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .service(web::scope(&prefix).configure(postwall::configure))
    })
    .bind(&addr)
    .with_context(|| format!("failed to bind {}", addr))?
    .run()
    .await
    .context("server terminated")?;

    Ok(())
}
