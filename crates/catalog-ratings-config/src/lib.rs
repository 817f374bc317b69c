pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{CatalogConfig, Config, DefaultsConfig, DEFAULT_BASE_URL};
pub use credentials::{CredentialStore, DEVELOPER_TOKEN_ENV, USER_TOKEN_ENV};
pub use paths::{PathManager, container_base_path};
