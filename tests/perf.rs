use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

use postwall::auth::TokenRegistry;
use postwall::posts::PostService;
use postwall::store::InMemoryPostStore;
use postwall::AppState;

const NUM_USERS: usize = 200;
const NUM_POSTS: usize = 5;

#[ignore]
#[actix_web::test]
async fn perf_test_concurrent_likes() {
    let registry = Arc::new(TokenRegistry::new(24));
    let tokens: Vec<String> = (0..NUM_USERS)
        .map(|i| registry.issue(&format!("perf_user_{}", i)))
        .collect();
    let owner = registry.issue("perf_owner");

    let state = web::Data::new(AppState::new(
        Arc::new(PostService::new(Arc::new(InMemoryPostStore::new()))),
        registry,
    ));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(postwall::configure)
    })
    .workers(4)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind perf server");
    let base_url = format!("http://{}", server.addrs()[0]);
    actix_web::rt::spawn(server.run());

    let client = reqwest::Client::new();
    let start = Instant::now();

    println!("\n=== Performance Test ===");
    println!("{} users liking {} posts concurrently...", NUM_USERS, NUM_POSTS);

    let mut post_ids = Vec::new();
    for n in 0..NUM_POSTS {
        let post: serde_json::Value = client
            .post(format!("{}/posts", base_url))
            .bearer_auth(&owner)
            .json(&serde_json::json!({"text": format!("perf post {}", n)}))
            .send()
            .await
            .expect("Failed to create post")
            .json()
            .await
            .unwrap();
        post_ids.push(post["id"].as_str().unwrap().to_string());
    }

    let like_start = Instant::now();
    let mut tasks = JoinSet::new();
    for token in &tokens {
        for post_id in &post_ids {
            let client = client.clone();
            let url = format!("{}/posts/like/{}", base_url, post_id);
            let token = token.clone();
            tasks.spawn(async move {
                client
                    .post(url)
                    .bearer_auth(token)
                    .send()
                    .await
                    .map(|resp| resp.status().as_u16())
            });
        }
    }

    let mut likes_ok = 0;
    let mut likes_failed = 0;
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(200)) => likes_ok += 1,
            _ => likes_failed += 1,
        }
    }
    let like_time = like_start.elapsed();

    for post_id in &post_ids {
        let post: serde_json::Value = client
            .get(format!("{}/posts/{}", base_url, post_id))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(post["likes"].as_array().unwrap().len(), NUM_USERS);
    }

    let total_time = start.elapsed();
    println!("\n=== Results ===");
    println!("Total time: {:.2}s", total_time.as_secs_f64());
    println!("Like phase: {:.2}s", like_time.as_secs_f64());
    println!("Likes accepted: {}", likes_ok);
    println!("Likes failed: {}", likes_failed);
    println!(
        "Throughput: {:.0} likes/sec",
        likes_ok as f64 / like_time.as_secs_f64()
    );
    assert_eq!(likes_failed, 0);
}
