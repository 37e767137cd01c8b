use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure that can be loaded from CLI, config file, or environment
///
/// Example configuration file content
/// # Converter Gateway Configuration
///
/// # Server configuration
/// listen_on_port = 3000
///
/// # Upstream conversion site
/// upstream_base = "https://ytmp3.cx"
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    #[serde(default = "default_port")]
    pub listen_on_port: u16,

    /// Base URL of the upstream conversion site
    #[arg(short, long, default_value = "https://ytmp3.cx")]
    #[serde(default = "default_upstream_base")]
    pub upstream_base: String,

    /// Configuration file path (overrides all other arguments)
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_on_port: default_port(),
            upstream_base: default_upstream_base(),
            config: None,
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> Result<Self> {
        // First parse CLI args (and the PORT environment variable)
        let mut config = Config::parse();

        // If a config file is specified, load it and merge
        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence
    fn merge_with_file(mut self, file_config: Config) -> Self {
        // If CLI value is default, use file value
        if self.listen_on_port == default_port() {
            self.listen_on_port = file_config.listen_on_port;
        }
        if self.upstream_base == default_upstream_base() {
            self.upstream_base = file_config.upstream_base;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.upstream_base.is_empty() {
            return Err(anyhow::anyhow!("Upstream base URL cannot be empty"));
        }
        if !self.upstream_base.starts_with("http://") && !self.upstream_base.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "Upstream base URL must start with http:// or https://"
            ));
        }

        Ok(())
    }
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_upstream_base() -> String {
    "https://ytmp3.cx".to_string()
}
