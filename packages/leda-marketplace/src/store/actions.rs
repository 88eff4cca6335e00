//! Async actions. Each publishes `Pending`, awaits one client or service
//! call, then publishes `Fulfilled` or `Rejected` and hands the result back
//! to the caller.

use super::{AsyncOutcome, Rejection, Store, StoreAction};
use crate::client::{BuyItemClient, DelistItemClient, ListItemClient, MintClient};
use crate::services::{
    CollectionService, DraftItemRequest, ItemService, ProcessLazyItemRequest, Services,
};
use crate::state::MarketplaceState;
use crate::{Error, Result};
use leda_types::{Address, Collection, History, Item, ItemId, ItemsFilters, Page};
use std::future::Future;
use tracing::{info, warn};

/// Input for [`mint_nft`]: the draft to store, plus the sale terms used once
/// the token is minted.
#[derive(Debug, Clone)]
pub struct MintNftRequest {
    pub draft: DraftItemRequest,
    pub price: f64,
    pub token_uri: String,
}

impl MintNftRequest {
    /// Everything the mint transaction needs, checked before the draft is
    /// stored. Lazy drafts are never sent to the chain, so only their
    /// draft fields are checked.
    pub fn validate(&self) -> Result<()> {
        if self.draft.address.is_empty() {
            return Err(Error::Validation("mint: missing address".into()));
        }
        if self.draft.name.trim().is_empty() {
            return Err(Error::Validation("mint: missing item name".into()));
        }
        if self.draft.is_lazy {
            return Ok(());
        }
        if !(self.price.is_finite() && self.price > 0.0) {
            return Err(Error::Validation(format!("invalid price: {}", self.price)));
        }
        if self.token_uri.trim().is_empty() {
            return Err(Error::Validation("missing token uri".into()));
        }
        Ok(())
    }
}

async fn run<T, F>(
    store: &mut Store,
    wrap: fn(AsyncOutcome<T>) -> StoreAction,
    task: F,
) -> Result<T>
where
    T: Clone,
    F: Future<Output = Result<T>>,
{
    store.dispatch(wrap(AsyncOutcome::Pending));
    match task.await {
        Ok(value) => {
            store.dispatch(wrap(AsyncOutcome::Fulfilled(value.clone())));
            Ok(value)
        }
        Err(e) => {
            if e.is_diverged() {
                warn!(error = %e, "Action rejected with diverged state, item needs a re-read");
            }
            store.dispatch(wrap(AsyncOutcome::Rejected(Rejection::from(&e))));
            Err(e)
        }
    }
}

// --- Items ---

pub async fn find_all(store: &mut Store, items: &dyn ItemService) -> Result<Vec<Item>> {
    run(store, StoreAction::FindAll, async {
        items.find_all().await.map_err(Error::Index)
    })
    .await
}

pub async fn find_by_id(store: &mut Store, items: &dyn ItemService, item_id: &ItemId) -> Result<Item> {
    run(store, StoreAction::FindById, async {
        items.find_by_id(item_id).await.map_err(|e| match e {
            crate::error::ServiceError::NotFound(msg) => Error::NotFound(msg),
            other => Error::Index(other),
        })
    })
    .await
}

pub async fn find_history(
    store: &mut Store,
    items: &dyn ItemService,
    item_id: &ItemId,
) -> Result<Vec<History>> {
    run(store, StoreAction::FindHistory, async {
        items
            .find_history_by_item_id(item_id)
            .await
            .map_err(Error::Index)
    })
    .await
}

pub async fn like_item(
    store: &mut Store,
    items: &dyn ItemService,
    item_id: &ItemId,
    address: &Address,
) -> Result<Item> {
    run(store, StoreAction::LikeItem, async {
        items.like(item_id, address).await.map_err(Error::Index)
    })
    .await
}

pub async fn process_lazy_item(
    store: &mut Store,
    items: &dyn ItemService,
    request: &ProcessLazyItemRequest,
) -> Result<Item> {
    run(store, StoreAction::ProcessLazyItem, async {
        items.process_lazy_item(request).await.map_err(Error::Index)
    })
    .await
}

// --- Marketplace ---

pub async fn list_item(store: &mut Store, services: &Services, state: MarketplaceState) -> Result<Item> {
    run(store, StoreAction::ListItem, async {
        Ok(ListItemClient::new(services, state).execute().await?.item)
    })
    .await
}

pub async fn buy_item(store: &mut Store, services: &Services, state: MarketplaceState) -> Result<Item> {
    run(store, StoreAction::BuyItem, async {
        Ok(BuyItemClient::new(services, state).execute().await?.item)
    })
    .await
}

pub async fn delist_item(store: &mut Store, services: &Services, state: MarketplaceState) -> Result<Item> {
    run(store, StoreAction::DelistItem, async {
        Ok(DelistItemClient::new(services, state).execute().await?.item)
    })
    .await
}

/// Store the draft, then mint and list it. Lazy drafts stop after the
/// draft is stored; they are minted when first bought.
pub async fn mint_nft(store: &mut Store, services: &Services, request: MintNftRequest) -> Result<Item> {
    run(store, StoreAction::MintNft, async move {
        request.validate()?;
        let draft = services
            .items
            .create(&request.draft)
            .await
            .map_err(Error::Index)?;
        if request.draft.is_lazy {
            info!(item_id = %draft.item_id, "Stored lazy item");
            return Ok(draft);
        }
        let state = MarketplaceState::new(draft, request.draft.address.clone())
            .with_price(request.price)
            .with_token_uri(request.token_uri);
        Ok(MintClient::new(services, state).execute().await?.item)
    })
    .await
}

// --- Collections ---

pub async fn find_all_collections(
    store: &mut Store,
    collections: &dyn CollectionService,
) -> Result<Vec<Collection>> {
    run(store, StoreAction::FindAllCollections, async {
        collections.find_all().await.map_err(Error::Index)
    })
    .await
}

/// Query collections with the filters currently held by the store.
pub async fn find_filtered_collections(
    store: &mut Store,
    collections: &dyn CollectionService,
) -> Result<Page<Collection>> {
    let filters = store.collections().collections_filters().clone();
    run(store, StoreAction::FindFilteredCollections, async move {
        collections.find_filtered(&filters).await.map_err(Error::Index)
    })
    .await
}

pub async fn find_collection_by_id(
    store: &mut Store,
    collections: &dyn CollectionService,
    collection_id: &str,
) -> Result<Collection> {
    run(store, StoreAction::FindCollectionById, async {
        collections.find_by_id(collection_id).await.map_err(|e| match e {
            crate::error::ServiceError::NotFound(msg) => Error::NotFound(msg),
            other => Error::Index(other),
        })
    })
    .await
}

/// Fetch the page named by the selected collection's item filters.
pub async fn find_paged_collection_items(
    store: &mut Store,
    collections: &dyn CollectionService,
) -> Result<Page<Item>> {
    let (collection_id, filters) = match store.collections().selected() {
        Some(detail) => (detail.collection.id.clone(), detail.items_filters.clone()),
        None => return Err(Error::NotFound("no collection selected".into())),
    };
    run(store, StoreAction::FindPagedItems, async move {
        collections
            .find_paged_items(&collection_id, &filters)
            .await
            .map_err(Error::Index)
    })
    .await
}

/// Replace the item filters and refetch from page 1.
pub async fn set_items_filters(
    store: &mut Store,
    collections: &dyn CollectionService,
    filters: ItemsFilters,
) -> Result<Page<Item>> {
    store.dispatch(StoreAction::SetItemsFilters(filters));
    find_paged_collection_items(store, collections).await
}

/// Fetch the next page if the last one came back full. Returns `None`
/// when there is nothing more to load. If no page has been fetched yet for
/// the selected collection, the current page is fetched as-is.
pub async fn load_more_items(
    store: &mut Store,
    collections: &dyn CollectionService,
) -> Result<Option<Page<Item>>> {
    let nothing_fetched = store
        .collections()
        .selected()
        .is_some_and(|detail| detail.items_stats.page == 0);
    if nothing_fetched {
        return find_paged_collection_items(store, collections).await.map(Some);
    }
    if !store.more_available() {
        return Ok(None);
    }
    store.dispatch(StoreAction::NextItemsPage);
    find_paged_collection_items(store, collections).await.map(Some)
}
