use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const DEVELOPER_TOKEN_ENV: &str = "CATALOG_RATINGS_DEVELOPER_TOKEN";
pub const USER_TOKEN_ENV: &str = "CATALOG_RATINGS_USER_TOKEN";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn get_developer_token(&self) -> Option<&String> {
        self.get("developer_token")
    }

    pub fn set_developer_token(&mut self, token: String) {
        self.set("developer_token".to_string(), token);
    }

    pub fn get_music_user_token(&self) -> Option<&String> {
        self.get("music_user_token")
    }

    pub fn set_music_user_token(&mut self, token: String) {
        self.set("music_user_token".to_string(), token);
    }

    pub fn get_developer_token_expires(&self) -> Option<DateTime<Utc>> {
        self.get("developer_token_expires")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_developer_token_expires(&mut self, expires: DateTime<Utc>) {
        self.set("developer_token_expires".to_string(), expires.to_rfc3339());
    }

    /// True when an expiry is recorded and has already passed.
    pub fn is_developer_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.get_developer_token_expires()
            .map(|expires| expires <= now)
            .unwrap_or(false)
    }

    /// Developer token, with the environment taking precedence over the file
    pub fn resolved_developer_token(&self) -> Option<String> {
        resolve(std::env::var(DEVELOPER_TOKEN_ENV).ok(), self.get_developer_token())
    }

    /// Music user token, with the environment taking precedence over the file
    pub fn resolved_music_user_token(&self) -> Option<String> {
        resolve(std::env::var(USER_TOKEN_ENV).ok(), self.get_music_user_token())
    }
}

fn resolve(env_value: Option<String>, stored: Option<&String>) -> Option<String> {
    env_value
        .filter(|v| !v.is_empty())
        .or_else(|| stored.filter(|v| !v.is_empty()).cloned())
}
