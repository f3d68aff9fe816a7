//! Wire-level and domain enums shared by handlers and storage.

pub mod filters;
pub mod interaction;

pub use filters::{FeedQuery, Page, PropertyFilters};
pub use interaction::{InteractionType, Resolution};
