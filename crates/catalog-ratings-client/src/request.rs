use crate::decode::decode_ratings;
use crate::endpoint::{build_endpoint, EndpointReference};
use crate::error::{BuildError, RequestError};
use crate::transport::Transport;
use catalog_ratings_models::{ItemId, ItemType, RatingsResponse};
use tracing::debug;

/// A request for the current user's ratings of one or more catalog items of
/// the same type.
///
/// ```ignore
/// let request = RatingRequest::new(["1440857781", "1440857782"], ItemType::Song)?;
/// let ratings = request.execute(&transport, DEFAULT_BASE_URL).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingRequest {
    item_type: ItemType,
    ids: Vec<ItemId>,
}

impl RatingRequest {
    /// Request ratings for several items in one call.
    pub fn new<I, S>(ids: I, item_type: ItemType) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids = ids
            .into_iter()
            .enumerate()
            .map(|(position, id)| ItemId::new(id).map_err(|_| BuildError::EmptyIdentifier(position)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_ids(ids, item_type)
    }

    /// Request the rating of a single item.
    pub fn with_id(id: impl Into<String>, item_type: ItemType) -> Result<Self, BuildError> {
        let id: String = id.into();
        Self::new([id], item_type)
    }

    pub fn from_ids(ids: Vec<ItemId>, item_type: ItemType) -> Result<Self, BuildError> {
        if ids.is_empty() {
            return Err(BuildError::EmptyIdentifiers);
        }
        Ok(Self { item_type, ids })
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn endpoint(&self, base: &str) -> Result<EndpointReference, BuildError> {
        build_endpoint(base, self.item_type, &self.ids)
    }

    /// Build the endpoint, fetch it through `transport` and decode the body.
    pub async fn execute<T>(&self, transport: &T, base: &str) -> Result<RatingsResponse, RequestError>
    where
        T: Transport + ?Sized,
    {
        let endpoint = self.endpoint(base)?;
        debug!(
            item_type = %self.item_type,
            count = self.ids.len(),
            "Fetching ratings from {}",
            endpoint
        );

        let body = transport.fetch(&endpoint).await?;
        let ratings = decode_ratings(&body)?;

        debug!(
            "Received {} rating(s) for {} requested {}",
            ratings.len(),
            self.ids.len(),
            self.item_type
        );
        Ok(ratings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, TransportError};
    use async_trait::async_trait;
    use catalog_ratings_models::RatingValue;
    use std::sync::{Arc, Mutex};

    const BASE: &str = "https://api.music.apple.com/v1/";

    enum Reply {
        Body(&'static str),
        Status(u16),
    }

    struct StubTransport {
        reply: Reply,
        seen: Mutex<Vec<String>>,
    }

    impl StubTransport {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn fetch(&self, endpoint: &EndpointReference) -> Result<Vec<u8>, TransportError> {
            self.seen.lock().unwrap().push(endpoint.to_string());
            match &self.reply {
                Reply::Body(body) => Ok(body.as_bytes().to_vec()),
                Reply::Status(status) => Err(TransportError::Status {
                    status: *status,
                    body: String::new(),
                }),
            }
        }
    }

    #[test]
    fn test_single_id_matches_batch_of_one() {
        let single = RatingRequest::with_id("111", ItemType::Album).unwrap();
        let batch = RatingRequest::new(vec!["111"], ItemType::Album).unwrap();

        assert_eq!(single, batch);
        assert_eq!(single.endpoint(BASE).unwrap(), batch.endpoint(BASE).unwrap());
    }

    #[test]
    fn test_empty_request_rejected() {
        let result = RatingRequest::new(Vec::<String>::new(), ItemType::Song);
        assert!(matches!(result, Err(BuildError::EmptyIdentifiers)));

        let result = RatingRequest::from_ids(Vec::new(), ItemType::Song);
        assert!(matches!(result, Err(BuildError::EmptyIdentifiers)));
    }

    #[test]
    fn test_empty_identifier_reports_position() {
        let result = RatingRequest::new(["1", "", "3"], ItemType::Song);
        assert!(matches!(result, Err(BuildError::EmptyIdentifier(1))));

        let result = RatingRequest::with_id("", ItemType::Song);
        assert!(matches!(result, Err(BuildError::EmptyIdentifier(0))));
    }

    #[test]
    fn test_accessors_keep_order() {
        let request = RatingRequest::new(["b", "a", "c"], ItemType::Station).unwrap();
        assert_eq!(request.item_type(), ItemType::Station);
        let ids: Vec<&str> = request.ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_execute_decodes_partial_response() {
        let transport = StubTransport::new(Reply::Body(
            r#"{"data":[{"id":"111","type":"songs","attributes":{"value":"like"}}]}"#,
        ));
        let request = RatingRequest::new(["111", "222"], ItemType::Song).unwrap();

        let ratings = request.execute(&transport, BASE).await.unwrap();
        assert_eq!(ratings.rating("111"), Some(RatingValue::Like));
        assert!(!ratings.contains("222"));
        assert_eq!(ratings.missing(request.ids()).len(), 1);
        assert_eq!(
            transport.seen(),
            vec!["https://api.music.apple.com/v1/me/ratings/songs?ids=111,222".to_string()]
        );
    }

    #[tokio::test]
    async fn test_execute_through_shared_transport() {
        let transport: Arc<dyn Transport> = Arc::new(StubTransport::new(Reply::Body(r#"{"data":[]}"#)));
        let request = RatingRequest::with_id("1", ItemType::Playlist).unwrap();

        let ratings = request.execute(&transport, BASE).await.unwrap();
        assert!(ratings.is_empty());
    }

    #[tokio::test]
    async fn test_execute_build_error_skips_transport() {
        let transport = StubTransport::new(Reply::Body(r#"{"data":[]}"#));
        let request = RatingRequest::with_id("1", ItemType::Song).unwrap();

        let result = request.execute(&transport, "::not a base::").await;
        assert!(matches!(result, Err(RequestError::Build(_))));
        assert!(transport.seen().is_empty());
    }

    #[tokio::test]
    async fn test_execute_passes_transport_error_through() {
        let transport = StubTransport::new(Reply::Status(500));
        let request = RatingRequest::with_id("1", ItemType::Song).unwrap();

        let result = request.execute(&transport, BASE).await;
        assert!(matches!(
            result,
            Err(RequestError::Transport(TransportError::Status { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_execute_reports_decode_error() {
        let transport = StubTransport::new(Reply::Body("not json"));
        let request = RatingRequest::with_id("1", ItemType::Song).unwrap();

        let result = request.execute(&transport, BASE).await;
        assert!(matches!(
            result,
            Err(RequestError::Decode(DecodeError::MalformedPayload(_)))
        ));
    }
}
