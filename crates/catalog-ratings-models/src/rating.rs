use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::item_id::ItemId;
use crate::item_type::ItemType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RatingValue {
    Like,
    Dislike,
    Neutral,
}

impl RatingValue {
    /// Numeric form used by the catalog service (1 / -1 / 0).
    pub fn as_i8(&self) -> i8 {
        match self {
            RatingValue::Like => 1,
            RatingValue::Dislike => -1,
            RatingValue::Neutral => 0,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(RatingValue::Like),
            -1 => Some(RatingValue::Dislike),
            0 => Some(RatingValue::Neutral),
            _ => None,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "like" => Some(RatingValue::Like),
            "dislike" => Some(RatingValue::Dislike),
            "neutral" => Some(RatingValue::Neutral),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingValue::Like => "like",
            RatingValue::Dislike => "dislike",
            RatingValue::Neutral => "neutral",
        }
    }
}

/// A single rating returned by the catalog service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatingRecord {
    pub id: ItemId,
    /// Resource `type` exactly as the service sent it (`songs`, `ratings`, ...)
    pub resource_type: String,
    pub value: RatingValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Attributes other than `value`, passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl RatingRecord {
    pub fn item_type(&self) -> Option<ItemType> {
        ItemType::from_resource_type(&self.resource_type)
    }
}

/// Ratings keyed by item identifier.
///
/// An identifier that was requested but has no entry simply has no rating;
/// absence is never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RatingsResponse {
    records: HashMap<ItemId, RatingRecord>,
}

impl RatingsResponse {
    /// Later records replace earlier ones with the same identifier.
    pub fn from_records(records: impl IntoIterator<Item = RatingRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self { records }
    }

    pub fn get(&self, id: &str) -> Option<&RatingRecord> {
        self.records.get(id)
    }

    pub fn rating(&self, id: &str) -> Option<RatingValue> {
        self.records.get(id).map(|r| r.value)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RatingRecord> {
        self.records.values()
    }

    /// Requested identifiers that carry no rating, in request order.
    pub fn missing<'a>(&self, requested: &'a [ItemId]) -> Vec<&'a ItemId> {
        requested
            .iter()
            .filter(|id| !self.records.contains_key(id.as_str()))
            .collect()
    }

    pub fn likes(&self) -> impl Iterator<Item = &RatingRecord> {
        self.iter().filter(|r| r.value == RatingValue::Like)
    }

    pub fn dislikes(&self) -> impl Iterator<Item = &RatingRecord> {
        self.iter().filter(|r| r.value == RatingValue::Dislike)
    }
}
