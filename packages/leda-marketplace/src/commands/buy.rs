use super::{ChainCommand, Command};
use crate::services::{ItemService, MarketplaceService};
use crate::state::{Action, ChainReceipt, MarketplaceState};
use crate::{Error, Result};
use async_trait::async_trait;
use leda_types::Item;
use std::sync::Arc;
use tracing::debug;

pub struct BuyItemCommand {
    marketplace: Arc<dyn MarketplaceService>,
}

impl BuyItemCommand {
    pub fn new(marketplace: Arc<dyn MarketplaceService>) -> Self {
        Self { marketplace }
    }
}

impl ChainCommand for BuyItemCommand {
    const ACTION: Action = Action::Buy;
}

#[async_trait]
impl Command for BuyItemCommand {
    type Output = ChainReceipt;

    async fn execute(&self, state: &MarketplaceState) -> Result<ChainReceipt> {
        debug!(item_id = %state.item_id(), buyer = %state.address, "Submitting buy transaction");
        self.marketplace
            .buy(state.item_id(), &state.address)
            .await
            .map_err(Error::Chain)
    }
}

/// Transfer ownership in the index after a confirmed purchase.
pub struct StoreBuyItemCommand {
    items: Arc<dyn ItemService>,
}

impl StoreBuyItemCommand {
    pub fn new(items: Arc<dyn ItemService>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Command for StoreBuyItemCommand {
    type Output = Item;

    async fn execute(&self, state: &MarketplaceState) -> Result<Item> {
        let receipt = state.require_receipt()?;
        self.items
            .buy(state.item_id(), &receipt.owner)
            .await
            .map_err(Error::Index)
    }
}
