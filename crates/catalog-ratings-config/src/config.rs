use catalog_ratings_models::ItemType;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://api.music.apple.com/v1/";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Where and how the catalog service is reached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// Root the `me/ratings/...` path is resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefaultsConfig {
    /// Item type used when the command line does not name one
    #[serde(default = "default_item_type")]
    pub item_type: ItemType,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("catalog-ratings/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_item_type() -> ItemType {
    ItemType::Song
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            item_type: default_item_type(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// A missing file is not an error: every key has a default.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.catalog.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("catalog.timeout_seconds must be greater than zero"));
        }

        let base = url::Url::parse(&self.catalog.base_url)
            .map_err(|e| anyhow::anyhow!("catalog.base_url is not a valid URL: {}", e))?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(anyhow::anyhow!(
                "catalog.base_url must be an http(s) URL with a host, got {}",
                self.catalog.base_url
            ));
        }

        if self.catalog.user_agent.trim().is_empty() {
            return Err(anyhow::anyhow!("catalog.user_agent cannot be empty"));
        }

        Ok(())
    }
}
