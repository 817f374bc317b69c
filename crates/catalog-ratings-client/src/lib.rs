pub mod decode;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod request;
pub mod transport;

pub use decode::decode_ratings;
pub use endpoint::{build_endpoint, EndpointReference};
pub use error::{BuildError, DecodeError, RequestError, TransportError};
pub use http::{create_catalog_client, HttpTransport};
pub use request::RatingRequest;
pub use transport::Transport;
