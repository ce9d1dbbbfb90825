//! Startup configuration, loaded once from `config.yml` and read-only
//! afterwards. Secrets may be supplied through the environment instead of
//! the file.

use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Prefix that marks a message as a command invocation, e.g. `!`.
    pub command_prefix: String,
    /// Discord bot token; `DISCORD_API_TOKEN` takes precedence.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub database_url: Option<String>,
    pub anilist: AniListConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AniListConfig {
    pub api_client_id: i64,
    /// Falls back to `ANILIST_API_SECRET` when not in the file.
    #[serde(default)]
    pub api_client_secret: Option<String>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Config> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Login token resolution: environment first, then the config file.
    pub fn discord_token(&self) -> Option<String> {
        std::env::var("DISCORD_API_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .or_else(|| self.token.clone())
    }

    pub fn anilist_secret(&self) -> Option<String> {
        self.anilist
            .api_client_secret
            .clone()
            .or_else(|| std::env::var("ANILIST_API_SECRET").ok())
            .filter(|secret| !secret.is_empty())
    }

    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .filter(|url| !url.is_empty())
    }
}
