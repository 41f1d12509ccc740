//! Filter/sort/paginate pipeline over an in-memory collection snapshot.
//!
//! Everything here is synchronous and pure: the snapshot is only borrowed and
//! the same `(items, criteria)` always yields the same page.

pub mod criteria;
pub mod pipeline;

pub use criteria::{Category, Criteria, SortKey};
pub use pipeline::{Discoverable, Page, discover};
