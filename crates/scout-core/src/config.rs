use std::time::Duration;

use crate::error::AppError;
use crate::pacing::PacingConfig;

/// Browser-like user agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Tunables for one process. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum listings returned to the caller.
    pub max_listings: usize,
    /// Timeout for reachability probes of candidate URLs.
    pub probe_timeout: Duration,
    /// Timeout for full page fetches.
    pub fetch_timeout: Duration,
    /// Timeout for one web search query.
    pub search_timeout: Duration,
    /// Timeout for one model call.
    pub model_timeout: Duration,
    pub user_agent: String,
    pub pacing: PacingConfig,
    /// Ask the model to rewrite the keywords before searching.
    pub refine_keywords: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_listings: 10,
            probe_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(10),
            search_timeout: Duration::from_secs(10),
            model_timeout: Duration::from_secs(60),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            pacing: PacingConfig::default(),
            refine_keywords: false,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by environment variables.
    ///
    /// - `SCOUT_MAX_LISTINGS` (defaults to 10, must be at least 1)
    /// - `SCOUT_PROBE_TIMEOUT_SECS`, `SCOUT_FETCH_TIMEOUT_SECS`,
    ///   `SCOUT_SEARCH_TIMEOUT_SECS`, `SCOUT_MODEL_TIMEOUT_SECS`
    /// - `SCOUT_USER_AGENT`
    /// - `SCOUT_PAUSE_MS`, `SCOUT_PAUSE_JITTER_MS`
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("SCOUT_MAX_LISTINGS") {
            let parsed = parse_number(&raw, "SCOUT_MAX_LISTINGS")?;
            if parsed == 0 {
                return Err(AppError::ConfigError(
                    "SCOUT_MAX_LISTINGS must be at least 1".into(),
                ));
            }
            config.max_listings = parsed as usize;
        }
        if let Some(raw) = lookup("SCOUT_PROBE_TIMEOUT_SECS") {
            config.probe_timeout = parse_timeout(&raw, "SCOUT_PROBE_TIMEOUT_SECS")?;
        }
        if let Some(raw) = lookup("SCOUT_FETCH_TIMEOUT_SECS") {
            config.fetch_timeout = parse_timeout(&raw, "SCOUT_FETCH_TIMEOUT_SECS")?;
        }
        if let Some(raw) = lookup("SCOUT_SEARCH_TIMEOUT_SECS") {
            config.search_timeout = parse_timeout(&raw, "SCOUT_SEARCH_TIMEOUT_SECS")?;
        }
        if let Some(raw) = lookup("SCOUT_MODEL_TIMEOUT_SECS") {
            config.model_timeout = parse_timeout(&raw, "SCOUT_MODEL_TIMEOUT_SECS")?;
        }
        if let Some(agent) = lookup("SCOUT_USER_AGENT").filter(|a| !a.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("SCOUT_PAUSE_MS") {
            config.pacing.delay = Duration::from_millis(parse_number(&raw, "SCOUT_PAUSE_MS")?);
        }
        if let Some(raw) = lookup("SCOUT_PAUSE_JITTER_MS") {
            config.pacing.jitter =
                Duration::from_millis(parse_number(&raw, "SCOUT_PAUSE_JITTER_MS")?);
        }

        Ok(config)
    }
}

fn parse_number(raw: &str, key: &str) -> Result<u64, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid {key} '{raw}': must be a non-negative integer"
        ))
    })
}

fn parse_timeout(raw: &str, key: &str) -> Result<Duration, AppError> {
    let secs = parse_number(raw, key)?;
    if secs == 0 {
        return Err(AppError::ConfigError(format!("{key} must be at least 1")));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = SearchConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.max_listings, 10);
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(!config.refine_keywords);
    }

    #[test]
    fn test_env_overrides() {
        let config = SearchConfig::from_lookup(lookup_from(&[
            ("SCOUT_MAX_LISTINGS", "25"),
            ("SCOUT_FETCH_TIMEOUT_SECS", "15"),
            ("SCOUT_USER_AGENT", "scout-test/1.0"),
            ("SCOUT_PAUSE_MS", "0"),
            ("SCOUT_PAUSE_JITTER_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.max_listings, 25);
        assert_eq!(config.fetch_timeout, Duration::from_secs(15));
        assert_eq!(config.user_agent, "scout-test/1.0");
        assert_eq!(config.pacing, PacingConfig::disabled());
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = SearchConfig::from_lookup(lookup_from(&[("SCOUT_MAX_LISTINGS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));

        let err = SearchConfig::from_lookup(lookup_from(&[("SCOUT_MAX_LISTINGS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("at least 1"));

        let err = SearchConfig::from_lookup(lookup_from(&[("SCOUT_PROBE_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
