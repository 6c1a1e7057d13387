//! Feed data: item types, paginated sources, and the grid state for one list.
//!
//! # Architecture
//!
//! - [`types`] - `Item`, `Notification`, and their JSON records
//! - [`source`] - the `PageSource` trait, `Pagination`, and background page loads
//! - [`fixture`] - a JSON-file backend implementing every remote trait
//! - [`grid`] - `FeedGrid`, a loaded list with its partition, focus, and scroll

pub mod fixture;
pub mod grid;
pub mod source;
pub mod types;

pub use fixture::{FixtureError, FixtureOptions, FixtureService};
pub use grid::FeedGrid;
pub use source::{spawn_page_load, PageLoaded, PageRequest, PageSource, Pagination, SourceError};
pub use types::{Item, Notification, NotificationReason, Page};
