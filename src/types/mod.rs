//! Canonical row shapes shared by every consumer.
//!
//! Remote column names drifted over time (`useruid`, `userUID`, `user_id`);
//! the aliases on these structs are the only place that drift is handled.

pub mod auth;
pub mod post;
pub mod practitioner;
pub mod therapy;

pub use auth::AuthUser;
pub use post::{NewPost, NewReply, Post, PostBoard, Reply};
pub use practitioner::{Practitioner, ProfileUpdate, SellerRow};
pub use therapy::{SellerTherapyLink, Therapy};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Case-insensitive name equality used for therapies, specialties and categories.
pub fn same_name(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
