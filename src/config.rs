use clap::{Parser, ValueEnum};
use std::time::Duration;

use crate::rate_limit::{FailPolicy, WindowPolicy};

// Which counter store backs the rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Upstash,
    Redis,
    Memory,
}

// CLI argument structure, every option can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "passcraft-api")]
#[command(about = "Password generation API with distributed rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    // Counter store backend
    #[arg(long, env = "COUNTER_STORE", value_enum, default_value_t = StoreKind::Upstash)]
    pub store: StoreKind,

    // Upstash REST endpoint and token
    #[arg(long, env = "UPSTASH_REDIS_REST_URL")]
    pub upstash_url: Option<String>,

    #[arg(long, env = "UPSTASH_REDIS_REST_TOKEN", hide_env_values = true)]
    pub upstash_token: Option<String>,

    // Plain Redis connection string
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1/")]
    pub redis_url: String,

    // Rate limit max requests per window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value_t = 30)]
    pub rate_limit: u64,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // What to do when the counter store is down
    #[arg(long, env = "RATE_LIMIT_FAIL_POLICY", value_enum, default_value_t = FailPolicy::Open)]
    pub fail_policy: FailPolicy,

    // Counter store call timeout in milliseconds
    #[arg(long, env = "COUNTER_STORE_TIMEOUT_MS", default_value_t = 2000)]
    pub store_timeout_ms: u64,

    // Origins allowed to call /generate (comma-separated)
    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "https://passcraft.fr,https://www.passcraft.fr"
    )]
    pub allowed_origins: Vec<String>,

    // Desktop app version this API ships alongside
    #[arg(long, env = "CURRENT_VERSION", default_value = "1.1.1")]
    pub current_version: String,

    // Where the latest released version is published
    #[arg(
        long,
        env = "VERSION_URL",
        default_value = "https://raw.githubusercontent.com/Kyosuke01/PassCraft/main/version.txt"
    )]
    pub version_url: String,

    #[arg(
        long,
        env = "DOWNLOAD_URL",
        default_value = "https://github.com/Kyosuke01/PassCraft/releases/latest"
    )]
    pub download_url: String,

    // Directory holding favicon.ico
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: String,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("--upstash-url (UPSTASH_REDIS_REST_URL) is required for the upstash store")]
    MissingUpstashUrl,
    #[error("--upstash-token (UPSTASH_REDIS_REST_TOKEN) is required for the upstash store")]
    MissingUpstashToken,
    #[error("rate limit window must be at least one second")]
    ZeroWindow,
    #[error("rate limit must allow at least one request")]
    ZeroLimit,
}

impl Args {
    /// Rejects option combinations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store == StoreKind::Upstash {
            if self.upstash_url.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingUpstashUrl);
            }
            if self.upstash_token.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingUpstashToken);
            }
        }
        if self.rate_window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.rate_limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        Ok(())
    }

    pub fn window_policy(&self) -> WindowPolicy {
        WindowPolicy {
            window: Duration::from_secs(self.rate_window),
            max_requests: self.rate_limit,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .iter()
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("passcraft-api").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_are_thirty_per_minute() {
        let args = parse(&["--store", "memory"]);
        assert_eq!(args.window_policy(), WindowPolicy::default());
        assert_eq!(args.fail_policy, FailPolicy::Open);
        assert_eq!(
            args.origins(),
            vec!["https://passcraft.fr", "https://www.passcraft.fr"]
        );
        assert_eq!(args.validate(), Ok(()));
    }

    #[test]
    fn upstash_requires_credentials() {
        let args = parse(&["--store", "upstash", "--upstash-url", "https://x.upstash.io"]);
        assert_eq!(args.validate(), Err(ConfigError::MissingUpstashToken));

        let args = parse(&[
            "--store",
            "upstash",
            "--upstash-url",
            "https://x.upstash.io",
            "--upstash-token",
            "t",
        ]);
        assert_eq!(args.validate(), Ok(()));
    }

    #[test]
    fn zero_window_is_rejected() {
        let args = parse(&["--store", "memory", "--rate-window", "0"]);
        assert_eq!(args.validate(), Err(ConfigError::ZeroWindow));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        let args = parse(&[
            "--store",
            "memory",
            "--allowed-origins",
            "http://localhost:3000/, https://a.example",
        ]);
        assert_eq!(
            args.origins(),
            vec!["http://localhost:3000", "https://a.example"]
        );
    }
}
