use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_url: String,
    pub notify_token: String,
    pub cache_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            notify_url: env::var("NOTIFY_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/notify".to_string()),
            notify_token: env::var("NOTIFY_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            cache_ttl_secs: env::var("CACHE_TTL_SECS").unwrap_or_else(|_| "300".to_string()).parse().expect("CACHE_TTL_SECS must be a number"),
        }
    }
}
