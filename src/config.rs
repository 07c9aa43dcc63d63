use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};

use crate::teams::TeamRoster;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub roster: TeamRoster,
}

impl AppConfig {
    /// Loads `.env.local` and `.env` (if present) and then reads the environment.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Result<Self> {
        let api_url = env::var("NRR_API_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("NRR_API_URL is not set"))
            .context("calculation service address is required")?;
        Self::from_parts(
            &api_url,
            env::var("NRR_TIMEOUT_SECS").ok().as_deref(),
            env::var("NRR_TEAMS").ok().as_deref(),
        )
    }

    /// Builds a config from raw values, applying the same defaults as [`AppConfig::from_env`].
    pub fn from_parts(api_url: &str, timeout_secs: Option<&str>, teams: Option<&str>) -> Result<Self> {
        let api_url = api_url.trim().trim_end_matches('/').to_string();
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(anyhow!("invalid NRR_API_URL: {api_url}"));
        }
        let timeout_secs = timeout_secs
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);
        let roster = teams
            .and_then(TeamRoster::parse_list)
            .unwrap_or_default();
        Ok(Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            roster,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::AppConfig;

    #[test]
    fn defaults_apply_when_optional_values_missing() {
        let cfg = AppConfig::from_parts("http://localhost:8080/", None, None).expect("config");
        assert_eq!(cfg.api_url, "http://localhost:8080");
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.roster.len(), 5);
    }

    #[test]
    fn timeout_is_clamped_and_teams_override() {
        let cfg = AppConfig::from_parts("https://nrr.example", Some("900"), Some("X, Y"))
            .expect("config");
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert_eq!(cfg.roster.names(), &["X", "Y"]);
    }

    #[test]
    fn rejects_url_without_scheme() {
        assert!(AppConfig::from_parts("localhost:8080", None, None).is_err());
    }
}
