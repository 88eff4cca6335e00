//! In-memory chain and index adapters.
//!
//! Both enforce the same transition rules as the real systems and support
//! failure injection, so the whole pipeline can run without a node or an
//! index server.

use crate::error::ServiceError;
use crate::services::{
    ActivateItemRequest, CollectionService, DraftItemRequest, ItemService, MarketplaceService,
    MintRequest, ProcessLazyItemRequest,
};
use crate::state::ChainReceipt;
use async_trait::async_trait;
use leda_types::{
    Address, Collection, CollectionFilters, History, HistoryKind, Item, ItemId, ItemStatus,
    ItemsFilters, Page,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn not_found(item_id: &ItemId) -> ServiceError {
    ServiceError::NotFound(format!("item {item_id}"))
}

fn paginate<T: Clone>(rows: &[T], page: u32, limit: u32, with_total: bool) -> Page<T> {
    let page = page.max(1);
    let start = (page as usize - 1).saturating_mul(limit as usize);
    let items = rows
        .iter()
        .skip(start)
        .take(limit as usize)
        .cloned()
        .collect();
    Page {
        items,
        page,
        limit,
        total: with_total.then_some(rows.len() as u64),
    }
}

fn matches_search(name: &str, search: Option<&str>) -> bool {
    match search {
        Some(term) if !term.is_empty() => name.to_lowercase().contains(&term.to_lowercase()),
        _ => true,
    }
}

// --- Chain ---

#[derive(Default)]
struct ChainInner {
    items: HashMap<ItemId, Item>,
    next_token_id: u64,
    next_list_id: u64,
    tx_count: u64,
    failure: Option<ServiceError>,
}

impl ChainInner {
    fn guard(&self) -> Result<(), ServiceError> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn item(&self, item_id: &ItemId) -> Result<&Item, ServiceError> {
        self.items.get(item_id).ok_or_else(|| not_found(item_id))
    }

    fn confirm(&mut self, item: Item) -> ChainReceipt {
        self.tx_count += 1;
        let receipt = ChainReceipt {
            item_id: item.item_id.clone(),
            status: item.status,
            price: item.price,
            owner: item.owner.clone(),
            token_id: item.token_id,
            list_id: item.list_id,
            tx_hash: format!("0x{:064x}", self.tx_count),
        };
        self.items.insert(item.item_id.clone(), item);
        receipt
    }
}

/// Marketplace contract simulated in memory.
#[derive(Default)]
pub struct InMemoryChain {
    inner: Mutex<ChainInner>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register tokens that already exist on chain.
    pub fn seed(&self, items: impl IntoIterator<Item = Item>) {
        let mut inner = lock(&self.inner);
        for item in items {
            inner.next_token_id = inner.next_token_id.max(item.token_id.unwrap_or(0));
            inner.next_list_id = inner.next_list_id.max(item.list_id.unwrap_or(0));
            inner.items.insert(item.item_id.clone(), item);
        }
    }

    /// Make every following call fail with `err`.
    pub fn fail_with(&self, err: ServiceError) {
        lock(&self.inner).failure = Some(err);
    }

    pub fn heal(&self) {
        lock(&self.inner).failure = None;
    }

    /// Confirmed transactions so far.
    pub fn tx_count(&self) -> u64 {
        lock(&self.inner).tx_count
    }

    pub fn item(&self, item_id: &ItemId) -> Option<Item> {
        lock(&self.inner).items.get(item_id).cloned()
    }
}

#[async_trait]
impl MarketplaceService for InMemoryChain {
    async fn buy(&self, item_id: &ItemId, address: &Address) -> Result<ChainReceipt, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard()?;
        let item = inner.item(item_id)?;
        if &item.owner == address {
            return Err(ServiceError::Rejected(format!(
                "{address} already owns item {item_id}"
            )));
        }
        let sold = item.sell(address)?;
        Ok(inner.confirm(sold))
    }

    async fn list(
        &self,
        item_id: &ItemId,
        price: f64,
        list_id: u64,
        address: &Address,
    ) -> Result<ChainReceipt, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard()?;
        let item = inner.item(item_id)?;
        if &item.owner != address {
            return Err(ServiceError::Rejected(format!(
                "{address} does not own item {item_id}"
            )));
        }
        let listed = item.list(price, list_id)?;
        Ok(inner.confirm(listed))
    }

    async fn delist(&self, item_id: &ItemId, address: &Address) -> Result<ChainReceipt, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard()?;
        let item = inner.item(item_id)?;
        if &item.owner != address {
            return Err(ServiceError::Rejected(format!(
                "{address} does not own item {item_id}"
            )));
        }
        let delisted = item.delist()?;
        Ok(inner.confirm(delisted))
    }

    async fn mint(&self, request: &MintRequest) -> Result<ChainReceipt, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard()?;
        if inner.items.contains_key(&request.item_id) {
            return Err(ServiceError::Rejected(format!(
                "item {} is already minted",
                request.item_id
            )));
        }
        inner.next_token_id += 1;
        inner.next_list_id += 1;
        let (token_id, list_id) = (inner.next_token_id, inner.next_list_id);
        let mut draft = Item::draft(request.item_id.clone(), request.address.clone(), "");
        draft.royalty = request.royalty;
        let minted = draft.activate(token_id, request.price, list_id)?;
        debug!(item_id = %request.item_id, token_id, "Minted token");
        Ok(inner.confirm(minted))
    }
}

// --- Index ---

#[derive(Default)]
struct IndexInner {
    items: HashMap<ItemId, Item>,
    /// Insertion order; `find_all` reads it back to front.
    order: Vec<ItemId>,
    history: Vec<History>,
    collections: Vec<Collection>,
    next_item_id: u64,
    write_failure: Option<ServiceError>,
    writes: u64,
    with_totals: bool,
}

impl IndexInner {
    fn item(&self, item_id: &ItemId) -> Result<&Item, ServiceError> {
        self.items.get(item_id).ok_or_else(|| not_found(item_id))
    }

    fn guard_write(&self) -> Result<(), ServiceError> {
        match &self.write_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn insert(&mut self, item: Item) {
        if let Err(e) = item.check_invariant() {
            warn!(item_id = %item.item_id, error = %e, "Index holds an item that violates the status invariant");
        }
        if !self.items.contains_key(&item.item_id) {
            self.order.push(item.item_id.clone());
        }
        self.items.insert(item.item_id.clone(), item);
    }

    /// Store `item` and record the transition that produced it.
    fn write(&mut self, item: Item, kind: HistoryKind, address: &Address) -> Item {
        self.writes += 1;
        self.history.push(History {
            id: (self.history.len() + 1).to_string(),
            item_id: item.item_id.clone(),
            kind,
            address: address.clone(),
            price: item.price,
            tx_hash: None,
            timestamp: unix_now(),
        });
        self.insert(item.clone());
        item
    }
}

/// Item and collection index held in memory.
pub struct InMemoryIndex {
    inner: Mutex<IndexInner>,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self {
            inner: Mutex::new(IndexInner {
                with_totals: true,
                ..Default::default()
            }),
        }
    }
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paged queries leave `total` unset, like older index deployments.
    pub fn without_totals(self) -> Self {
        lock(&self.inner).with_totals = false;
        self
    }

    pub fn seed(&self, items: impl IntoIterator<Item = Item>) {
        let mut inner = lock(&self.inner);
        for item in items {
            inner.insert(item);
        }
    }

    pub fn seed_collections(&self, collections: impl IntoIterator<Item = Collection>) {
        lock(&self.inner).collections.extend(collections);
    }

    /// Make every following write fail with `err`. Reads keep working.
    pub fn fail_writes(&self, err: ServiceError) {
        lock(&self.inner).write_failure = Some(err);
    }

    pub fn heal(&self) {
        lock(&self.inner).write_failure = None;
    }

    /// Successful writes so far.
    pub fn write_count(&self) -> u64 {
        lock(&self.inner).writes
    }

    pub fn item(&self, item_id: &ItemId) -> Option<Item> {
        lock(&self.inner).items.get(item_id).cloned()
    }
}

#[async_trait]
impl ItemService for InMemoryIndex {
    async fn find_all(&self) -> Result<Vec<Item>, ServiceError> {
        let inner = lock(&self.inner);
        Ok(inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.items.get(id).cloned())
            .collect())
    }

    async fn find_by_id(&self, item_id: &ItemId) -> Result<Item, ServiceError> {
        lock(&self.inner).item(item_id).cloned()
    }

    async fn buy(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        let sold = inner.item(item_id)?.sell(address)?;
        Ok(inner.write(sold, HistoryKind::Buy, address))
    }

    async fn list(
        &self,
        item_id: &ItemId,
        price: f64,
        list_id: u64,
        address: &Address,
    ) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        let item = inner.item(item_id)?;
        // A listed item can only have its price changed.
        let (updated, kind) = if item.is_listed() {
            (item.change_price(price)?, HistoryKind::ChangePrice)
        } else {
            (item.list(price, list_id)?, HistoryKind::List)
        };
        Ok(inner.write(updated, kind, address))
    }

    async fn delist(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        let delisted = inner.item(item_id)?.delist()?;
        Ok(inner.write(delisted, HistoryKind::Delist, address))
    }

    async fn create(&self, draft: &DraftItemRequest) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        if draft.name.trim().is_empty() {
            return Err(ServiceError::Rejected("item name is required".into()));
        }
        inner.next_item_id += 1;
        let item_id = ItemId::new(format!("item-{}", inner.next_item_id));
        let mut item = Item::draft(item_id, draft.address.clone(), draft.name.clone());
        item.description = draft.description.clone();
        item.image = draft.image.clone();
        item.tags = draft.tags.clone();
        item.royalty = draft.royalty;
        item.collection_id = draft.collection_id.clone();
        if draft.is_lazy {
            item.status = ItemStatus::Lazy;
        }
        inner.writes += 1;
        inner.insert(item.clone());
        Ok(item)
    }

    async fn activate(&self, request: &ActivateItemRequest) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        let activated =
            inner
                .item(&request.item_id)?
                .activate(request.token_id, request.price, request.list_id)?;
        Ok(inner.write(activated, HistoryKind::Mint, &request.address))
    }

    async fn process_lazy_item(&self, request: &ProcessLazyItemRequest) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        let redeemed = inner.item(&request.item_id)?.redeem_lazy(
            &request.address,
            request.token_id,
            request.price,
        )?;
        Ok(inner.write(redeemed, HistoryKind::Buy, &request.address))
    }

    async fn like(&self, item_id: &ItemId, _address: &Address) -> Result<Item, ServiceError> {
        let mut inner = lock(&self.inner);
        inner.guard_write()?;
        let liked = inner.item(item_id)?.like();
        inner.writes += 1;
        inner.insert(liked.clone());
        Ok(liked)
    }

    async fn find_all_history(&self) -> Result<Vec<History>, ServiceError> {
        Ok(lock(&self.inner).history.clone())
    }

    async fn find_history_by_item_id(&self, item_id: &ItemId) -> Result<Vec<History>, ServiceError> {
        Ok(lock(&self.inner)
            .history
            .iter()
            .filter(|h| &h.item_id == item_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CollectionService for InMemoryIndex {
    async fn find_all(&self) -> Result<Vec<Collection>, ServiceError> {
        Ok(lock(&self.inner).collections.clone())
    }

    async fn find_by_id(&self, collection_id: &str) -> Result<Collection, ServiceError> {
        lock(&self.inner)
            .collections
            .iter()
            .find(|c| c.id == collection_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("collection {collection_id}")))
    }

    async fn find_filtered(&self, filters: &CollectionFilters) -> Result<Page<Collection>, ServiceError> {
        let inner = lock(&self.inner);
        let rows: Vec<Collection> = inner
            .collections
            .iter()
            .filter(|c| matches_search(&c.name, filters.search.as_deref()))
            .cloned()
            .collect();
        Ok(paginate(&rows, filters.page, filters.limit, inner.with_totals))
    }

    async fn find_paged_items(
        &self,
        collection_id: &str,
        filters: &ItemsFilters,
    ) -> Result<Page<Item>, ServiceError> {
        let inner = lock(&self.inner);
        let rows: Vec<Item> = inner
            .order
            .iter()
            .filter_map(|id| inner.items.get(id))
            .filter(|item| item.collection_id.as_deref() == Some(collection_id))
            .filter(|item| matches_search(&item.name, filters.search.as_deref()))
            .cloned()
            .collect();
        Ok(paginate(&rows, filters.page, filters.limit, inner.with_totals))
    }
}
