use std::{fs, path::{Path, PathBuf}, net::SocketAddr};
use serde::{Serialize, Deserialize};
use toml;
use anyhow::{self, Context};

use funds::{Amount, GOAL, backend::StoreConfig, progress::is_valid_goal};

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
    /// Directory served under `/static`
    #[serde(default = "ServerConfig::default_static_dir")]
    pub static_dir: PathBuf
}

impl ServerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_owned()
    }

    fn default_port() -> u16 {
        3000
    }

    fn default_static_dir() -> PathBuf {
        PathBuf::from("resources/static")
    }

    pub fn address(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port).parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: Self::default_host(),
            port: Self::default_port(),
            static_dir: Self::default_static_dir()
        }
    }
}

fn default_goal() -> Amount {
    GOAL
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_goal")]
    pub goal: Amount,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig
}

impl AppConfig {
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(filepath)
            .with_context(|| "failed to read config file")?;
        return Self::parse(&file_content);
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .with_context(|| "failed to parse config file")?;
        anyhow::ensure!(is_valid_goal(config.goal),
            "goal must be a positive number, got {}", config.goal);
        return Ok(config);
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig { goal: GOAL, server: ServerConfig::default(), store: StoreConfig::default() }
    }
}
