//! Process configuration, read once at startup from the environment.

use std::time::Duration;

use anyhow::{Context, bail};

/// Everything the worker needs to run.
///
/// Constructed at process entry and handed into the consumer and engine;
/// there are no ambient globals.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin connection URL for the relational server (a maintenance
    /// database such as `template1`).
    pub pg_url: String,
    /// Redis URL for the queue and status store, including the db index.
    pub redis_url: String,
    /// Shared secret salted into the derived credential; must match the
    /// enqueuing peer's.
    pub shared_secret: String,
    /// Sleep between poll cycles.
    pub poll_interval: Duration,
}

const DEFAULT_PG_URL: &str = "postgres://postgres@localhost:5432/template1";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379/2";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let pg_url =
            std::env::var("PROVISIOND_PG_URL").unwrap_or_else(|_| DEFAULT_PG_URL.to_string());
        let redis_url =
            std::env::var("PROVISIOND_REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string());
        let shared_secret = std::env::var("PROVISIOND_SHARED_SECRET")
            .context("PROVISIOND_SHARED_SECRET must be set")?;
        let poll_interval = parse_poll_interval(
            std::env::var("PROVISIOND_POLL_INTERVAL_SECS").ok().as_deref(),
        )?;

        Ok(Self {
            pg_url,
            redis_url,
            shared_secret,
            poll_interval,
        })
    }
}

fn parse_poll_interval(raw: Option<&str>) -> anyhow::Result<Duration> {
    match raw {
        None => Ok(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)),
        Some(value) => {
            let secs: u64 = value
                .parse()
                .with_context(|| format!("invalid PROVISIOND_POLL_INTERVAL_SECS: {value:?}"))?;
            if secs == 0 {
                bail!("PROVISIOND_POLL_INTERVAL_SECS must be at least 1");
            }
            Ok(Duration::from_secs(secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_interval_defaults_to_ten_seconds() {
        assert_eq!(
            parse_poll_interval(None).unwrap(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn poll_interval_parses_seconds() {
        assert_eq!(
            parse_poll_interval(Some("30")).unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn poll_interval_rejects_garbage_and_zero() {
        assert!(parse_poll_interval(Some("soon")).is_err());
        assert!(parse_poll_interval(Some("0")).is_err());
    }
}
