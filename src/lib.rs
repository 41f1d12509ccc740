pub mod config;
pub mod discovery;
pub mod error;
pub mod fixtures;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;
pub mod supabase;
pub mod types;

pub use error::HubError;
