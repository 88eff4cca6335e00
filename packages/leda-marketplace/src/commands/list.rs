use super::{confirmed_list_id, confirmed_price, ChainCommand, Command};
use crate::services::{ItemService, MarketplaceService};
use crate::state::{Action, ChainReceipt, MarketplaceState};
use crate::{Error, Result};
use async_trait::async_trait;
use leda_types::Item;
use std::sync::Arc;
use tracing::debug;

/// Put an item on sale through the marketplace contract.
pub struct ListItemCommand {
    marketplace: Arc<dyn MarketplaceService>,
}

impl ListItemCommand {
    pub fn new(marketplace: Arc<dyn MarketplaceService>) -> Self {
        Self { marketplace }
    }
}

impl ChainCommand for ListItemCommand {
    const ACTION: Action = Action::List;
}

#[async_trait]
impl Command for ListItemCommand {
    type Output = ChainReceipt;

    async fn execute(&self, state: &MarketplaceState) -> Result<ChainReceipt> {
        let price = state.require_price()?;
        let list_id = state.require_list_id()?;
        debug!(item_id = %state.item_id(), price, list_id, "Submitting list transaction");
        self.marketplace
            .list(state.item_id(), price, list_id, &state.address)
            .await
            .map_err(Error::Chain)
    }
}

/// Record a confirmed listing in the index.
pub struct StoreListItemCommand {
    items: Arc<dyn ItemService>,
}

impl StoreListItemCommand {
    pub fn new(items: Arc<dyn ItemService>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Command for StoreListItemCommand {
    type Output = Item;

    async fn execute(&self, state: &MarketplaceState) -> Result<Item> {
        let receipt = state.require_receipt()?;
        let price = confirmed_price(receipt)?;
        let list_id = confirmed_list_id(receipt, state)?;
        self.items
            .list(state.item_id(), price, list_id, &state.address)
            .await
            .map_err(Error::Index)
    }
}
