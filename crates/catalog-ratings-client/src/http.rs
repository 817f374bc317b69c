use crate::endpoint::EndpointReference;
use crate::error::TransportError;
use crate::transport::Transport;
use async_trait::async_trait;
use catalog_ratings_config::{CatalogConfig, CredentialStore};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub fn create_catalog_client(user_agent: &str, timeout: Duration) -> Result<Client, TransportError> {
    let client = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// `Transport` backed by reqwest, authenticating with a developer token and a
/// music user token.
#[derive(Clone)]
pub struct HttpTransport {
    client: Arc<Client>,
    developer_token: String,
    music_user_token: Option<String>,
}

impl HttpTransport {
    pub fn new(client: Client, developer_token: String, music_user_token: Option<String>) -> Self {
        Self {
            client: Arc::new(client),
            developer_token,
            music_user_token,
        }
    }

    pub fn from_config(
        config: &CatalogConfig,
        credentials: &CredentialStore,
    ) -> Result<Self, TransportError> {
        let developer_token = credentials
            .resolved_developer_token()
            .ok_or(TransportError::MissingDeveloperToken)?;

        if credentials.is_developer_token_expired(Utc::now()) {
            warn!("Stored developer token has expired; the catalog service will likely reject it");
        }

        let client = create_catalog_client(
            &config.user_agent,
            Duration::from_secs(config.timeout_seconds),
        )?;

        Ok(Self::new(
            client,
            developer_token,
            credentials.resolved_music_user_token(),
        ))
    }

    pub fn has_user_token(&self) -> bool {
        self.music_user_token.is_some()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, endpoint: &EndpointReference) -> Result<Vec<u8>, TransportError> {
        // `me/` resources are personal; no point sending the request without one
        let user_token = self
            .music_user_token
            .as_deref()
            .ok_or(TransportError::MissingUserToken)?;

        debug!("Catalog API request: GET {}", endpoint);

        let response = self
            .client
            .get(endpoint.url().clone())
            .header("Authorization", format!("Bearer {}", self.developer_token))
            .header("Music-User-Token", user_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!("Catalog API response status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            error!("Catalog API rejected credentials: {} for URL: {}", status, endpoint);
            return Err(TransportError::Unauthorized(status.as_u16()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Catalog API error: {} for URL: {}", status, endpoint);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::build_endpoint;
    use crate::decode::decode_ratings;
    use catalog_ratings_models::{ItemId, ItemType, RatingValue};
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread::{self, JoinHandle};

    /// Accept one connection on a local port, answer it with the given status
    /// line and body, and hand back the raw request head.
    fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/v1/", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (base, handle)
    }

    fn local_transport() -> HttpTransport {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpTransport::new(client, "dev-token".to_string(), Some("user-token".to_string()))
    }

    async fn fetch_from(status_line: &str, body: &str) -> (Result<Vec<u8>, TransportError>, String) {
        let (base, server) = serve_once(status_line, body);
        let endpoint = build_endpoint(&base, ItemType::Song, &[ItemId::new("1").unwrap()]).unwrap();
        let result = local_transport().fetch(&endpoint).await;
        (result, server.join().unwrap())
    }

    #[tokio::test]
    async fn test_missing_user_token_fails_before_network() {
        let transport = HttpTransport::new(Client::new(), "dev".to_string(), None);
        assert!(!transport.has_user_token());

        // Unroutable host: reaching the network would surface as Network instead
        let endpoint = build_endpoint(
            "http://127.0.0.1:9/v1/",
            ItemType::Song,
            &[ItemId::new("1").unwrap()],
        )
        .unwrap();

        let result = transport.fetch(&endpoint).await;
        assert!(matches!(result, Err(TransportError::MissingUserToken)));
    }

    #[tokio::test]
    async fn test_fetch_sends_auth_headers_and_returns_body() {
        let body = r#"{"data":[{"id":"1","type":"ratings","attributes":{"value":-1}}]}"#;
        let (result, request) = fetch_from("200 OK", body).await;

        let ratings = decode_ratings(&result.unwrap()).unwrap();
        assert_eq!(ratings.rating("1"), Some(RatingValue::Dislike));

        let request = request.to_lowercase();
        assert!(request.starts_with("get /v1/me/ratings/songs?ids=1 "));
        assert!(request.contains("authorization: bearer dev-token\r\n"));
        assert!(request.contains("music-user-token: user-token\r\n"));
        assert!(request.contains("accept: application/json\r\n"));
    }

    #[tokio::test]
    async fn test_fetch_maps_rejected_credentials() {
        let (result, _) = fetch_from("401 Unauthorized", "").await;
        assert!(matches!(result, Err(TransportError::Unauthorized(401))));

        let (result, _) = fetch_from("403 Forbidden", "").await;
        assert!(matches!(result, Err(TransportError::Unauthorized(403))));
    }

    #[tokio::test]
    async fn test_fetch_maps_other_status_with_body() {
        let (result, _) = fetch_from("500 Internal Server Error", "boom").await;
        match result {
            Err(TransportError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_user_agent_is_an_error() {
        let result = create_catalog_client("bad\nagent", Duration::from_secs(5));
        assert!(matches!(result, Err(TransportError::Network(_))));

        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        store.set_developer_token("dev".to_string());
        let config = CatalogConfig {
            user_agent: "bad\nagent".to_string(),
            ..CatalogConfig::default()
        };
        assert!(matches!(
            HttpTransport::from_config(&config, &store),
            Err(TransportError::Network(_))
        ));
    }

    #[test]
    fn test_from_config_requires_developer_token() {
        if std::env::var(catalog_ratings_config::DEVELOPER_TOKEN_ENV).is_ok() {
            return;
        }
        let store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        let result = HttpTransport::from_config(&CatalogConfig::default(), &store);
        assert!(matches!(result, Err(TransportError::MissingDeveloperToken)));
    }

    #[test]
    fn test_from_config_with_stored_tokens() {
        let mut store = CredentialStore::new(PathBuf::from("/nonexistent/credentials.toml"));
        store.set_developer_token("dev".to_string());
        store.set_music_user_token("user".to_string());

        let transport = HttpTransport::from_config(&CatalogConfig::default(), &store).unwrap();
        assert!(transport.has_user_token());
    }
}
