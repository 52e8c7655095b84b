// Centralized configuration for the bot process

use std::path::PathBuf;

use anyhow::{anyhow, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PREFIX: &str = "!";

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x00bfff;
    pub const SUCCESS: u32 = 0x2ecc71;
    pub const ERROR: u32 = 0xff0000;
    pub const WARNING: u32 = 0xffa500;
    pub const INFO: u32 = 0x3498db;
}

/// Settings taken from the environment (and `.env`) at startup.
/// Everything else lives in `<data_dir>/config.json`.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub data_dir: PathBuf,
    pub prefix: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = non_empty("DISCORD_TOKEN").ok_or_else(|| anyhow!("DISCORD_TOKEN must be set"))?;
        let data_dir = non_empty("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let prefix = non_empty("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        Ok(Self {
            token,
            data_dir,
            prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.prefix, "!");
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("DATA_DIR", "/var/lib/bot"),
            ("COMMAND_PREFIX", "?"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/bot"));
        assert_eq!(config.prefix, "?");
    }

    #[test]
    fn test_missing_token() {
        assert!(BotConfig::from_lookup(lookup(&[("DISCORD_TOKEN", "  ")])).is_err());
        assert!(BotConfig::from_lookup(lookup(&[])).is_err());
    }
}
