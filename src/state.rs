use std::path::PathBuf;

use crate::rate_limit::RateLimiter;

// Where /check-update looks for the latest release
#[derive(Debug, Clone)]
pub struct UpdateSource {
    pub current_version: String,
    pub version_url: String,
    pub download_url: String,
}

// app's shared state

pub struct AppState {
    pub client: reqwest::Client,
    pub rate_limiter: RateLimiter,
    pub allowed_origins: Vec<String>,
    pub update: UpdateSource,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        origin.is_some_and(|origin| self.allowed_origins.iter().any(|o| o == origin))
    }
}
