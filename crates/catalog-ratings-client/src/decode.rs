use crate::error::DecodeError;
use catalog_ratings_models::{ItemId, RatingRecord, RatingValue, RatingsResponse};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use tracing::trace;

#[derive(Debug, Deserialize)]
struct RatingsEnvelope {
    data: Vec<RatingResource>,
}

#[derive(Debug, Deserialize)]
struct RatingResource {
    id: ItemId,
    #[serde(rename = "type")]
    resource_type: String,
    #[serde(default)]
    href: Option<String>,
    attributes: RatingAttributes,
}

#[derive(Debug, Deserialize)]
struct RatingAttributes {
    value: WireRating,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRating {
    Number(i64),
    Label(String),
}

/// Rating as sent on the wire: the service uses `1` / `-1` / `0`, but the
/// textual labels are accepted as well.
#[derive(Debug)]
struct WireRating(RatingValue);

impl<'de> Deserialize<'de> for WireRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawRating::deserialize(deserializer)?;
        let value = match &raw {
            RawRating::Number(n) => RatingValue::from_i64(*n),
            RawRating::Label(label) => RatingValue::from_label(label),
        };
        value
            .map(WireRating)
            .ok_or_else(|| de::Error::custom(format!("unrecognized rating value {:?}", raw)))
    }
}

impl From<RatingResource> for RatingRecord {
    fn from(resource: RatingResource) -> Self {
        RatingRecord {
            id: resource.id,
            resource_type: resource.resource_type,
            value: resource.attributes.value.0,
            href: resource.href,
            metadata: resource.attributes.extra,
        }
    }
}

/// Decode a ratings response body.
///
/// Identifiers without a rating are simply absent from `data`, so the result
/// never has to line up one-to-one with the request. Either the whole body
/// decodes or nothing is returned.
pub fn decode_ratings(data: &[u8]) -> Result<RatingsResponse, DecodeError> {
    let envelope: RatingsEnvelope = serde_json::from_slice(data)?;
    trace!("Decoded {} rating record(s)", envelope.data.len());
    Ok(RatingsResponse::from_records(
        envelope.data.into_iter().map(RatingRecord::from),
    ))
}
