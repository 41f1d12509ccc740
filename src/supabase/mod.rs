//! Thin client for the hosted backend: PostgREST tables, auth and storage.
//!
//! Layout:
//! - `query.rs`: select/filter/order/limit pushed down as query parameters
//! - `client.rs`: HTTP client, table reads and writes, error pass-through
//! - `auth.rs`: bearer token to session user
//! - `storage.rs`: blob upload returning a public URL

pub mod auth;
pub mod client;
pub mod query;
pub mod storage;

pub use client::StoreClient;
pub use query::{Direction, Select};
