//! Client-side store.
//!
//! Slices are mutated only through [`Store::dispatch`], and only with the
//! three outcomes of an async action (pending, fulfilled, rejected) or an
//! explicit filter change. Readers go through the selector methods.

pub mod actions;
mod collections_slice;
mod nft_slice;

pub use collections_slice::CollectionsSlice;
pub use nft_slice::NftSlice;

use crate::cache::FilterCache;
use crate::config::Config;
use crate::selection::{self, Cost, ItemFilters};
use crate::{Error, Result};
use leda_types::{Collection, CollectionFilters, History, Item, ItemId, ItemsFilters, Page};
use std::sync::Arc;
use tracing::trace;

/// Why an async action was rejected, as shown to the UI.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub message: String,
    /// Chain and index disagree; the UI should re-read the item.
    pub diverged: bool,
}

impl From<&Error> for Rejection {
    fn from(err: &Error) -> Self {
        Self {
            message: err.to_string(),
            diverged: err.is_diverged(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AsyncOutcome<T> {
    Pending,
    Fulfilled(T),
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    FindAll(AsyncOutcome<Vec<Item>>),
    FindById(AsyncOutcome<Item>),
    FindHistory(AsyncOutcome<Vec<History>>),
    BuyItem(AsyncOutcome<Item>),
    ListItem(AsyncOutcome<Item>),
    DelistItem(AsyncOutcome<Item>),
    MintNft(AsyncOutcome<Item>),
    ProcessLazyItem(AsyncOutcome<Item>),
    LikeItem(AsyncOutcome<Item>),
    FindAllCollections(AsyncOutcome<Vec<Collection>>),
    FindFilteredCollections(AsyncOutcome<Page<Collection>>),
    FindCollectionById(AsyncOutcome<Collection>),
    FindPagedItems(AsyncOutcome<Page<Item>>),
    /// Replace the selected collection's item filters and reset to page 1.
    SetItemsFilters(ItemsFilters),
    /// Advance the selected collection's item filters to the next page.
    NextItemsPage,
    SetCollectionsFilters(CollectionFilters),
    ResetCollectionsFilters,
}

impl StoreAction {
    pub fn name(&self) -> &'static str {
        match self {
            StoreAction::FindAll(_) => "ledaNft/findAll",
            StoreAction::FindById(_) => "ledaNft/findById",
            StoreAction::FindHistory(_) => "ledaNft/findHistory",
            StoreAction::BuyItem(_) => "marketplace/buyItem",
            StoreAction::ListItem(_) => "marketplace/listItem",
            StoreAction::DelistItem(_) => "marketplace/delistItem",
            StoreAction::MintNft(_) => "ledaNft/mintNft",
            StoreAction::ProcessLazyItem(_) => "ledaNft/processLazyItem",
            StoreAction::LikeItem(_) => "ledaNft/likeItem",
            StoreAction::FindAllCollections(_) => "collections/findAll",
            StoreAction::FindFilteredCollections(_) => "collections/findFiltered",
            StoreAction::FindCollectionById(_) => "collections/findById",
            StoreAction::FindPagedItems(_) => "collections/findPagedItems",
            StoreAction::SetItemsFilters(_) => "collections/setItemsFilters",
            StoreAction::NextItemsPage => "collections/nextItemsPage",
            StoreAction::SetCollectionsFilters(_) => "collections/setCollectionsFilters",
            StoreAction::ResetCollectionsFilters => "collections/resetCollectionsFilters",
        }
    }
}

/// Top-level state container. Passed by reference to whatever reads or
/// dispatches; there is no global instance.
pub struct Store {
    nft: NftSlice,
    collections: CollectionsSlice,
    cache: FilterCache,
    newest_count: usize,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Self {
            nft: NftSlice::default(),
            collections: CollectionsSlice::new(config.page_limit),
            cache: FilterCache::new(config.filter_cache_capacity),
            newest_count: config.newest_count,
        }
    }

    pub fn nft(&self) -> &NftSlice {
        &self.nft
    }

    pub fn collections(&self) -> &CollectionsSlice {
        &self.collections
    }

    pub fn dispatch(&mut self, action: StoreAction) {
        trace!(action = action.name(), "Dispatch");
        self.nft.reduce(&action);
        self.collections.reduce(&action);
    }

    // --- Selectors ---

    pub fn costed_item(&self, cost: Cost) -> Option<f64> {
        selection::select_costed_item(self.nft.items(), cost)
    }

    /// Memoized per snapshot generation.
    pub fn filtered_items(&mut self, filters: &ItemFilters) -> Arc<Vec<Item>> {
        self.cache
            .get_or_compute(self.nft.generation(), self.nft.items(), filters)
    }

    pub fn newest(&self) -> &[Item] {
        selection::select_newest(self.nft.items(), self.newest_count)
    }

    pub fn by_id(&self, item_id: &ItemId) -> Result<&Item> {
        selection::select_by_id(self.nft.items(), item_id)
    }

    /// Heuristic "load more" flag for the selected collection.
    pub fn more_available(&self) -> bool {
        self.collections
            .selected()
            .is_some_and(|detail| selection::more_available(&detail.items_stats))
    }

    pub fn has_more(&self) -> bool {
        self.collections
            .selected()
            .is_some_and(|detail| selection::has_more(&detail.items_stats))
    }

    pub fn filter_cache(&self) -> &FilterCache {
        &self.cache
    }
}
