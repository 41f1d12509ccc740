use serde::{Deserialize, Serialize};

use super::{null_as_default, same_name};

/// Named healing modality (Reiki, Yoga, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Therapy {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
}

impl Therapy {
    /// Case-insensitive match against either the display name or the URL path.
    pub fn is_named(&self, needle: &str) -> bool {
        same_name(&self.name, needle) || same_name(&self.path, needle)
    }
}

/// Row of the `seller_therapies` association table.
///
/// On reads the therapy comes back embedded; on writes only the ids are sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerTherapyLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapy_id: Option<i64>,
    #[serde(default, skip_serializing, alias = "therapy")]
    pub therapies: Option<Therapy>,
}

impl SellerTherapyLink {
    pub fn new(seller_id: i64, therapy_id: i64) -> Self {
        Self {
            seller_id: Some(seller_id),
            therapy_id: Some(therapy_id),
            therapies: None,
        }
    }
}
