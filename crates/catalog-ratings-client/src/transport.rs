use crate::endpoint::EndpointReference;
use crate::error::TransportError;
use async_trait::async_trait;
use std::sync::Arc;

/// Performs the authenticated GET for a ratings endpoint.
///
/// Implementations own everything below the URL: credentials, TLS, timeouts
/// and any retry policy. A successful call returns the raw response body of a
/// 2xx response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, endpoint: &EndpointReference) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, endpoint: &EndpointReference) -> Result<Vec<u8>, TransportError> {
        (**self).fetch(endpoint).await
    }
}
