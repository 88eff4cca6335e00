use super::{ChainCommand, Command};
use crate::services::{ItemService, MarketplaceService};
use crate::state::{Action, ChainReceipt, MarketplaceState};
use crate::{Error, Result};
use async_trait::async_trait;
use leda_types::Item;
use std::sync::Arc;
use tracing::debug;

pub struct DelistItemCommand {
    marketplace: Arc<dyn MarketplaceService>,
}

impl DelistItemCommand {
    pub fn new(marketplace: Arc<dyn MarketplaceService>) -> Self {
        Self { marketplace }
    }
}

impl ChainCommand for DelistItemCommand {
    const ACTION: Action = Action::Delist;
}

#[async_trait]
impl Command for DelistItemCommand {
    type Output = ChainReceipt;

    async fn execute(&self, state: &MarketplaceState) -> Result<ChainReceipt> {
        debug!(item_id = %state.item_id(), "Submitting delist transaction");
        self.marketplace
            .delist(state.item_id(), &state.address)
            .await
            .map_err(Error::Chain)
    }
}

pub struct StoreDelistItemCommand {
    items: Arc<dyn ItemService>,
}

impl StoreDelistItemCommand {
    pub fn new(items: Arc<dyn ItemService>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Command for StoreDelistItemCommand {
    type Output = Item;

    async fn execute(&self, state: &MarketplaceState) -> Result<Item> {
        state.require_receipt()?;
        self.items
            .delist(state.item_id(), &state.address)
            .await
            .map_err(Error::Index)
    }
}
