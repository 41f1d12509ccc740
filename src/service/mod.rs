pub mod catalog_actor;
pub mod registration;
pub mod source;

pub use catalog_actor::{CacheStatus, CacheView, CatalogHandle};
pub use source::{CatalogSource, Collection, CollectionKind, StoreSource};
