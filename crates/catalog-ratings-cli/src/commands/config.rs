use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use catalog_ratings_config::{Config, CredentialStore, PathManager, DEVELOPER_TOKEN_ENV, USER_TOKEN_ENV};
use catalog_ratings_models::ItemType;
use chrono::{DateTime, Utc};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    match cmd {
        ConfigCommands::Show { full } => show_config(&path_manager, full, output),
        ConfigCommands::Set { base_url, timeout, default_type } => {
            set_config(&path_manager, base_url, timeout, default_type, output)
        }
        ConfigCommands::Token { developer_token, user_token, expires } => {
            store_tokens(&path_manager, developer_token, user_token, expires, output)
        }
    }
}

fn mask_string(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

fn token_display(token: Option<&String>, full: bool) -> String {
    match token {
        Some(t) if full => t.clone(),
        Some(t) => mask_string(t),
        None => "not set".to_string(),
    }
}

fn show_config(path_manager: &PathManager, full: bool, output: &Output) -> Result<()> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        output.warn(format!("No configuration file at {}; using defaults", config_file.display()));
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

    let developer_token = token_display(cred_store.get_developer_token(), full);
    let user_token = token_display(cred_store.get_music_user_token(), full);
    let expires = cred_store
        .get_developer_token_expires()
        .map(|e| e.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Setting").add_attribute(comfy_table::Attribute::Bold),
                Cell::new("Value").add_attribute(comfy_table::Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display().to_string())]);
            table.add_row(vec![Cell::new("Base URL"), Cell::new(&config.catalog.base_url)]);
            table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.catalog.timeout_seconds))]);
            table.add_row(vec![Cell::new("User Agent"), Cell::new(&config.catalog.user_agent)]);
            table.add_row(vec![Cell::new("Default Type"), Cell::new(config.defaults.item_type.to_string())]);
            table.add_row(vec![Cell::new("Developer Token"), Cell::new(developer_token)]);
            table.add_row(vec![Cell::new("Token Expires"), Cell::new(expires)]);
            table.add_row(vec![Cell::new("Music User Token"), Cell::new(user_token)]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);

            for var in [DEVELOPER_TOKEN_ENV, USER_TOKEN_ENV] {
                if std::env::var(var).is_ok() {
                    println!("{}", format!("{} is set and overrides the stored value", var).bright_black());
                }
            }
            if cred_store.is_developer_token_expired(Utc::now()) {
                output.warn("Developer token has expired");
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "type": "config",
                "config_file": config_file.display().to_string(),
                "catalog": {
                    "base_url": config.catalog.base_url,
                    "timeout_seconds": config.catalog.timeout_seconds,
                    "user_agent": config.catalog.user_agent,
                },
                "defaults": {
                    "item_type": config.defaults.item_type,
                },
                "credentials": {
                    "developer_token": developer_token,
                    "developer_token_expires": expires,
                    "music_user_token": user_token,
                },
            }));
        }
    }

    Ok(())
}

fn set_config(
    path_manager: &PathManager,
    base_url: Option<String>,
    timeout: Option<u64>,
    default_type: Option<ItemType>,
    output: &Output,
) -> Result<()> {
    if base_url.is_none() && timeout.is_none() && default_type.is_none() {
        output.warn("Nothing to change. Use --base-url, --timeout, or --default-type");
        return Ok(());
    }

    let config_file = path_manager.config_file();
    let mut config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    if let Some(base_url) = base_url {
        config.catalog.base_url = base_url;
    }
    if let Some(timeout) = timeout {
        config.catalog.timeout_seconds = timeout;
    }
    if let Some(item_type) = default_type {
        config.defaults.item_type = item_type;
    }

    config.validate().map_err(|e| eyre!("{}", e))?;
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", path_manager.config_dir().display(), e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn parse_expiry(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| eyre!("Invalid --expires value '{}': {}", value, e))
}

fn store_tokens(
    path_manager: &PathManager,
    developer_token: Option<String>,
    user_token: Option<String>,
    expires: Option<String>,
    output: &Output,
) -> Result<()> {
    let expires = expires.as_deref().map(parse_expiry).transpose()?;

    let developer_token = match developer_token {
        Some(token) => Some(token),
        None => prompts::prompt_secret("Developer token (leave empty to keep current)")?,
    };
    let user_token = match user_token {
        Some(token) => Some(token),
        None => prompts::prompt_secret("Music user token (leave empty to keep current)")?,
    };

    if developer_token.is_none() && user_token.is_none() && expires.is_none() {
        output.warn("No tokens provided; credentials unchanged");
        return Ok(());
    }

    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", path_manager.config_dir().display(), e))?;
    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| eyre!("Failed to load credentials: {}", e))?;

    if let Some(token) = developer_token {
        cred_store.set_developer_token(token);
    }
    if let Some(token) = user_token {
        cred_store.set_music_user_token(token);
    }
    if let Some(expires) = expires {
        cred_store.set_developer_token_expires(expires);
    }
    cred_store
        .save()
        .map_err(|e| eyre!("Failed to save credentials: {}", e))?;

    output.success(format!("Credentials saved to {}", path_manager.credentials_file().display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string("short"), "*****");
        assert_eq!(mask_string("eyJhbGciOiJFUzI1NiJ9"), "eyJh…NiJ9");
    }

    #[test]
    fn test_parse_expiry() {
        let parsed = parse_expiry("2026-12-01T00:00:00Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2026-12-01T00:00:00+00:00");
        assert!(parse_expiry("next tuesday").is_err());
    }

    #[test]
    fn test_store_tokens_writes_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let output = Output::new(OutputFormat::Json, true);

        store_tokens(
            &paths,
            Some("dev".to_string()),
            Some("user".to_string()),
            Some("2026-12-01T00:00:00Z".to_string()),
            &output,
        )
        .unwrap();

        let mut store = CredentialStore::new(paths.credentials_file());
        store.load().unwrap();
        assert_eq!(store.get_developer_token(), Some(&"dev".to_string()));
        assert_eq!(store.get_music_user_token(), Some(&"user".to_string()));
        assert!(store.get_developer_token_expires().is_some());
    }

    #[test]
    fn test_set_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().to_path_buf());
        let output = Output::new(OutputFormat::Json, true);

        assert!(set_config(&paths, None, Some(0), None, &output).is_err());
        assert!(!paths.config_file().exists());

        set_config(&paths, None, Some(5), Some(ItemType::Playlist), &output).unwrap();
        let config = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(config.catalog.timeout_seconds, 5);
        assert_eq!(config.defaults.item_type, ItemType::Playlist);
    }
}
