// Environment-driven configuration for the grading worker.

use anyhow::{bail, Context, Result};
use std::time::Duration;

use crate::orchestrator::DEFAULT_CASE_CONCURRENCY;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_SANDBOX_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct GraderConfig {
    pub redis_url: String,
    pub sandbox_base_url: String,
    pub sandbox_timeout: Duration,
    pub case_concurrency: usize,
}

impl GraderConfig {
    pub fn new(
        redis_url: String,
        sandbox_base_url: String,
        sandbox_timeout_ms: u64,
        case_concurrency: usize,
    ) -> Result<Self> {
        let base = sandbox_base_url.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            bail!(
                "SANDBOX_BASE_URL is invalid: {:?}. Set it like https://ce.judge0.com",
                sandbox_base_url
            );
        }
        if case_concurrency == 0 {
            bail!("CASE_CONCURRENCY must be at least 1");
        }

        Ok(GraderConfig {
            redis_url,
            sandbox_base_url: base.to_string(),
            sandbox_timeout: Duration::from_millis(sandbox_timeout_ms),
            case_concurrency,
        })
    }

    pub fn from_env() -> Result<Self> {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        let sandbox_base_url =
            std::env::var("SANDBOX_BASE_URL").context("SANDBOX_BASE_URL is not set")?;

        let sandbox_timeout_ms = match std::env::var("SANDBOX_TIMEOUT_MS") {
            Ok(value) => value
                .parse()
                .context("SANDBOX_TIMEOUT_MS must be an integer of milliseconds")?,
            Err(_) => DEFAULT_SANDBOX_TIMEOUT_MS,
        };

        let case_concurrency = match std::env::var("CASE_CONCURRENCY") {
            Ok(value) => value
                .parse()
                .context("CASE_CONCURRENCY must be a positive integer")?,
            Err(_) => DEFAULT_CASE_CONCURRENCY,
        };

        Self::new(
            redis_url,
            sandbox_base_url,
            sandbox_timeout_ms,
            case_concurrency,
        )
    }
}
