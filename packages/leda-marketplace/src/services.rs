//! Service ports consumed by the commands.
//!
//! Implementations talk to the marketplace contract and to the off-chain
//! index. Both are external: the core only sees these traits, so tests and
//! local runs can substitute the in-memory adapters from [`crate::memory`].

use crate::error::ServiceError;
use crate::state::ChainReceipt;
use async_trait::async_trait;
use leda_types::{
    Address, Collection, CollectionFilters, History, ImageRef, Item, ItemId, ItemsFilters, Page,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to mint a drafted item and put it on sale in one transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintRequest {
    pub item_id: ItemId,
    pub token_uri: String,
    pub price: f64,
    pub royalty: u32,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftItemRequest {
    pub address: Address,
    pub name: String,
    pub description: String,
    pub image: ImageRef,
    pub tags: Vec<String>,
    pub royalty: u32,
    #[serde(default)]
    pub collection_id: Option<String>,
    pub is_lazy: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateItemRequest {
    pub item_id: ItemId,
    pub token_id: u64,
    pub list_id: u64,
    pub price: f64,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessLazyItemRequest {
    pub item_id: ItemId,
    pub token_id: u64,
    pub price: f64,
    /// Buyer redeeming the voucher.
    pub address: Address,
}

/// Writes to the marketplace contract. Every call returns only after the
/// transaction is confirmed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceService: Send + Sync {
    async fn buy(&self, item_id: &ItemId, address: &Address) -> Result<ChainReceipt, ServiceError>;

    async fn list(
        &self,
        item_id: &ItemId,
        price: f64,
        list_id: u64,
        address: &Address,
    ) -> Result<ChainReceipt, ServiceError>;

    async fn delist(&self, item_id: &ItemId, address: &Address) -> Result<ChainReceipt, ServiceError>;

    async fn mint(&self, request: &MintRequest) -> Result<ChainReceipt, ServiceError>;
}

/// Off-chain item index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemService: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Item>, ServiceError>;

    async fn find_by_id(&self, item_id: &ItemId) -> Result<Item, ServiceError>;

    async fn buy(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError>;

    async fn list(
        &self,
        item_id: &ItemId,
        price: f64,
        list_id: u64,
        address: &Address,
    ) -> Result<Item, ServiceError>;

    async fn delist(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError>;

    async fn create(&self, draft: &DraftItemRequest) -> Result<Item, ServiceError>;

    async fn activate(&self, request: &ActivateItemRequest) -> Result<Item, ServiceError>;

    async fn process_lazy_item(&self, request: &ProcessLazyItemRequest) -> Result<Item, ServiceError>;

    async fn like(&self, item_id: &ItemId, address: &Address) -> Result<Item, ServiceError>;

    async fn find_all_history(&self) -> Result<Vec<History>, ServiceError>;

    async fn find_history_by_item_id(&self, item_id: &ItemId) -> Result<Vec<History>, ServiceError>;
}

/// Off-chain collection index.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionService: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Collection>, ServiceError>;

    async fn find_by_id(&self, collection_id: &str) -> Result<Collection, ServiceError>;

    async fn find_filtered(&self, filters: &CollectionFilters) -> Result<Page<Collection>, ServiceError>;

    async fn find_paged_items(
        &self,
        collection_id: &str,
        filters: &ItemsFilters,
    ) -> Result<Page<Item>, ServiceError>;
}

/// Service handles constructed once and shared by every client.
#[derive(Clone)]
pub struct Services {
    pub marketplace: Arc<dyn MarketplaceService>,
    pub items: Arc<dyn ItemService>,
    pub collections: Arc<dyn CollectionService>,
}

impl Services {
    pub fn new(
        marketplace: Arc<dyn MarketplaceService>,
        items: Arc<dyn ItemService>,
        collections: Arc<dyn CollectionService>,
    ) -> Self {
        Self {
            marketplace,
            items,
            collections,
        }
    }
}
