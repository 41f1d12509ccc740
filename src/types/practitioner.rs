use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{null_as_default, same_name};
use super::therapy::SellerTherapyLink;

/// `seller` row as returned by the store, therapies embedded through the
/// association table.
#[derive(Debug, Clone, Deserialize)]
pub struct SellerRow {
    pub id: i64,
    #[serde(alias = "userUID", alias = "user_id")]
    pub useruid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: u32,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub availability: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seller_therapies: Vec<SellerTherapyLink>,
}

/// A practitioner listing as exposed to seekers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Practitioner {
    pub id: i64,
    pub useruid: String,
    pub email: Option<String>,
    pub name: String,
    pub title: String,
    pub bio: String,
    pub image: Option<String>,
    pub rating: Option<f64>,
    pub reviews: u32,
    pub price: Option<f64>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
    pub availability: Vec<String>,
    /// Therapy names joined through `seller_therapies`; a set, order carries no meaning.
    pub specialties: Vec<String>,
    pub verified: bool,
    pub featured: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub location: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<SellerRow> for Practitioner {
    fn from(row: SellerRow) -> Self {
        let mut specialties: Vec<String> = Vec::new();
        for therapy in row.seller_therapies.into_iter().filter_map(|l| l.therapies) {
            let name = therapy.name.trim();
            if !name.is_empty() && !specialties.iter().any(|s| same_name(s, name)) {
                specialties.push(name.to_string());
            }
        }

        Self {
            id: row.id,
            useruid: row.useruid,
            email: row.email,
            name: row.name,
            title: row.title,
            bio: row.bio,
            image: row.image,
            rating: row.rating,
            reviews: row.reviews,
            price: row.price,
            languages: row.languages,
            certifications: row.certifications,
            availability: row.availability,
            specialties,
            verified: row.verified,
            featured: row.featured,
            lat: row.lat,
            lng: row.lng,
            location: row.location,
            created_at: row.created_at,
        }
    }
}

impl Practitioner {
    pub fn has_specialty(&self, therapy: &str) -> bool {
        self.specialties.iter().any(|s| same_name(s, therapy))
    }
}

/// Partial update of the caller's own `seller` row. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
