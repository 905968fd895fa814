use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

/// Lower bound on the poll interval so a typo cannot hammer the upstream.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Credentials and tracked channels for the upstream status provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Channel logins to track.  Normalized on load.
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Base URL of a running quadview server.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Assign newly-live channels automatically when the main slot is empty.
    #[serde(default = "default_auto_follow")]
    pub auto_follow: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            poll_interval_secs: default_poll_interval_secs(),
            auto_follow: default_auto_follow(),
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_server_url() -> String {
    format!("http://{}:{}", default_bind_address(), default_port())
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_auto_follow() -> bool {
    true
}

/// Split a comma-separated channel list: trim, lowercase, drop empties.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    normalize_channels(raw.split(','))
}

fn normalize_channels<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim().to_lowercase();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<Self>(&content)?
        } else {
            let config = Self::default();
            config.save()?;
            config
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.upstream.channels =
            normalize_channels(config.upstream.channels.iter().map(String::as_str));
        Ok(config)
    }

    /// Environment overrides, looked up through `var` so tests stay hermetic.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(id) = var("TWITCH_CLIENT_ID") {
            self.upstream.client_id = id;
        }
        if let Some(secret) = var("TWITCH_CLIENT_SECRET") {
            self.upstream.client_secret = secret;
        }
        if let Some(list) = var("STREAMERS") {
            self.upstream.channels = parse_channel_list(&list);
        }
        if let Some(port) = var("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.polling.server_url, "http://127.0.0.1:3001");
        assert_eq!(config.polling.poll_interval_secs, 60);
        assert!(config.polling.auto_follow);
        assert!(config.upstream.channels.is_empty());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [upstream]
            channels = ["alpha"]

            [polling]
            poll_interval_secs = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.channels, ["alpha"]);
        assert_eq!(config.server.port, 3001);
        assert!(config.polling.auto_follow);
        assert_eq!(config.polling.interval().as_secs(), MIN_POLL_INTERVAL_SECS);
    }

    #[test]
    fn test_parse_channel_list() {
        assert_eq!(
            parse_channel_list(" Alpha, beta,,GAMMA ,alpha"),
            ["alpha", "beta", "gamma"]
        );
        assert!(parse_channel_list("").is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TWITCH_CLIENT_ID", "id"),
            ("STREAMERS", "One,two"),
            ("PORT", "4000"),
        ]);
        let mut config = Config::default();
        config.upstream.client_secret = "kept".into();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.upstream.client_id, "id");
        assert_eq!(config.upstream.client_secret, "kept");
        assert_eq!(config.upstream.channels, ["one", "two"]);
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let content = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&content).unwrap();
        assert_eq!(parsed.polling.server_url, "http://127.0.0.1:3001");
    }
}
