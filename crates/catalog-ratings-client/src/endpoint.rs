use crate::error::BuildError;
use catalog_ratings_models::{ItemId, ItemType};
use std::fmt;
use url::Url;

const RATINGS_PATH: &str = "me/ratings";

/// Fully-qualified URL of a ratings lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReference {
    url: Url,
}

impl EndpointReference {
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Identifiers carried in the `ids` query parameter, in order.
    ///
    /// The raw value is split on the literal comma before percent-decoding,
    /// so an identifier that itself contains a comma comes back intact.
    /// `None` when the parameter is absent or a segment does not decode to
    /// UTF-8; `build_endpoint` output always decodes.
    pub fn ids(&self) -> Option<Vec<String>> {
        let raw = self
            .url
            .query()?
            .split('&')
            .find_map(|pair| pair.strip_prefix("ids="))?;

        raw.split(',')
            .map(|part| urlencoding::decode(part).ok().map(|decoded| decoded.into_owned()))
            .collect()
    }
}

impl fmt::Display for EndpointReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Build `<base>/me/ratings/<type>?ids=<id>,<id>,...`.
///
/// Each identifier is percent-encoded on its own; the separating commas are
/// left as-is. `base` comes from configuration and may omit its trailing
/// slash.
pub fn build_endpoint(
    base: &str,
    item_type: ItemType,
    ids: &[ItemId],
) -> Result<EndpointReference, BuildError> {
    if ids.is_empty() {
        return Err(BuildError::EmptyIdentifiers);
    }

    let mut base_url = Url::parse(base)?;
    if !matches!(base_url.scheme(), "http" | "https") || base_url.host_str().is_none() {
        return Err(BuildError::UnsupportedBase(base.to_string()));
    }
    // Without the slash, `join` would replace the last path segment
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }

    let mut url = base_url.join(&format!("{}/{}", RATINGS_PATH, item_type.wire_tag()))?;

    let joined = ids
        .iter()
        .map(|id| urlencoding::encode(id.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    url.set_query(Some(&format!("ids={}", joined)));

    Ok(EndpointReference { url })
}
