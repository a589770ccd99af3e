pub const MIN_TEXT_LENGTH: usize = 1;
pub const MAX_TEXT_LENGTH: usize = 5000;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_AVATAR_LENGTH: usize = 2048;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_API_PREFIX: &str = "/api";

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

pub fn token_expiration_hours() -> i64 {
    env_or("POSTWALL_TOKEN_EXPIRATION_HOURS", 24)
}

/// Attempts allowed for a version-checked update on stores without an atomic
/// `update`, before giving up with a conflict.
pub fn max_write_retries() -> usize {
    env_or("POSTWALL_MAX_WRITE_RETRIES", 8usize).max(1)
}

pub fn bind_addr() -> String {
    std::env::var("POSTWALL_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

pub fn api_prefix() -> String {
    let prefix = std::env::var("POSTWALL_API_PREFIX")
        .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());
    normalize_prefix(&prefix)
}

/// `api/` and `/api` both become `/api`; an empty value mounts at the root.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Parses `POSTWALL_DEV_TOKENS`, a comma separated list of `token:user_id` pairs.
pub fn dev_tokens() -> Vec<(String, String)> {
    std::env::var("POSTWALL_DEV_TOKENS")
        .map(|raw| parse_token_pairs(&raw))
        .unwrap_or_default()
}

pub fn parse_token_pairs(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| {
            let (token, user) = pair.trim().split_once(':')?;
            let (token, user) = (token.trim(), user.trim());
            if token.is_empty() || user.is_empty() {
                return None;
            }
            Some((token.to_string(), user.to_string()))
        })
        .collect()
}

pub fn seed_posts() -> bool {
    std::env::var("POSTWALL_SEED_POSTS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}
