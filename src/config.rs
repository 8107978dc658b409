use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::engine::{EngineMode, EngineSettings};
use crate::store::PostgrestOptions;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub table: String,
    pub engine: EngineSettings,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mode = match lookup("LISTINGS_MODE") {
            Some(raw) => raw
                .parse::<EngineMode>()
                .map_err(anyhow::Error::msg)
                .context("LISTINGS_MODE must be client or server")?,
            None => EngineMode::default(),
        };

        let mut engine = EngineSettings::for_mode(mode);
        if let Some(raw) = lookup("LISTINGS_ROW_CAP") {
            engine.row_cap = raw
                .parse()
                .context("LISTINGS_ROW_CAP must be a positive number")?;
        }
        if let Some(raw) = lookup("LISTINGS_DEBOUNCE_MS") {
            let ms: u64 = raw
                .parse()
                .context("LISTINGS_DEBOUNCE_MS must be a number of milliseconds")?;
            engine.debounce = Duration::from_millis(ms);
        }
        if let Some(raw) = lookup("LISTINGS_FETCH_TIMEOUT_SECS") {
            let secs: u64 = raw
                .parse()
                .context("LISTINGS_FETCH_TIMEOUT_SECS must be a number of seconds")?;
            engine.fetch_timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            supabase_url: lookup("SUPABASE_URL"),
            supabase_anon_key: lookup("SUPABASE_ANON_KEY"),
            table: lookup("LISTINGS_TABLE").unwrap_or_else(|| "properties".to_string()),
            engine,
        })
    }

    /// Switch mode, keeping an explicitly configured row cap
    pub fn with_mode(mut self, mode: EngineMode) -> Self {
        if mode != self.engine.mode {
            let default_cap = EngineSettings::for_mode(self.engine.mode).row_cap;
            let row_cap = if self.engine.row_cap == default_cap {
                EngineSettings::for_mode(mode).row_cap
            } else {
                self.engine.row_cap
            };
            self.engine.mode = mode;
            self.engine.row_cap = row_cap;
        }
        self
    }

    /// Connection details for the hosted table
    pub fn postgrest(&self) -> Result<PostgrestOptions> {
        Ok(PostgrestOptions {
            base_url: self
                .supabase_url
                .clone()
                .context("SUPABASE_URL must be set (or pass --snapshot)")?,
            api_key: self
                .supabase_anon_key
                .clone()
                .context("SUPABASE_ANON_KEY must be set (or pass --snapshot)")?,
            table: self.table.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_client_mode_on_properties() {
        let config = config(&[]).unwrap();
        assert_eq!(config.table, "properties");
        assert_eq!(config.engine, EngineSettings::default());
        assert!(config.postgrest().is_err());
    }

    #[test]
    fn reads_engine_overrides() {
        let config = config(&[
            ("LISTINGS_MODE", "server"),
            ("LISTINGS_DEBOUNCE_MS", "250"),
            ("LISTINGS_FETCH_TIMEOUT_SECS", "5"),
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ])
        .unwrap();

        assert_eq!(config.engine.mode, EngineMode::Server);
        assert_eq!(config.engine.row_cap, 1000);
        assert_eq!(config.engine.debounce, Duration::from_millis(250));
        assert_eq!(config.engine.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.postgrest().unwrap().base_url, "https://example.supabase.co");
    }

    #[test]
    fn rejects_bad_numbers_and_modes() {
        assert!(config(&[("LISTINGS_ROW_CAP", "lots")]).is_err());
        assert!(config(&[("LISTINGS_MODE", "hybrid")]).is_err());
    }

    #[test]
    fn mode_switch_keeps_explicit_cap() {
        let switched = config(&[]).unwrap().with_mode(EngineMode::Server);
        assert_eq!(switched.engine.row_cap, 1000);

        let pinned = config(&[("LISTINGS_ROW_CAP", "200")])
            .unwrap()
            .with_mode(EngineMode::Server);
        assert_eq!(pinned.engine.row_cap, 200);
    }
}
