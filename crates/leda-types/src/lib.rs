//! Shared data model for the Leda NFT marketplace.
//! Pure types plus the status/price invariant. No async, no I/O.

mod collection;
mod error;
mod history;
mod ids;
mod item;

pub use collection::{Collection, CollectionDetail, CollectionFilters, ItemsFilters, ItemsStats, Page};
pub use error::ItemError;
pub use history::{History, HistoryKind};
pub use ids::{Address, ItemId};
pub use item::{ImageRef, Item, ItemStatus};
