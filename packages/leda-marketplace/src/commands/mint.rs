use super::{confirmed_list_id, confirmed_price, ChainCommand, Command};
use crate::services::{ActivateItemRequest, ItemService, MarketplaceService, MintRequest};
use crate::state::{Action, ChainReceipt, MarketplaceState};
use crate::{Error, Result};
use async_trait::async_trait;
use leda_types::Item;
use std::sync::Arc;
use tracing::debug;

/// Mint the token and create its marketplace entry.
pub struct MintItemCommand {
    marketplace: Arc<dyn MarketplaceService>,
}

impl MintItemCommand {
    pub fn new(marketplace: Arc<dyn MarketplaceService>) -> Self {
        Self { marketplace }
    }
}

impl ChainCommand for MintItemCommand {
    const ACTION: Action = Action::Mint;
}

#[async_trait]
impl Command for MintItemCommand {
    type Output = ChainReceipt;

    async fn execute(&self, state: &MarketplaceState) -> Result<ChainReceipt> {
        let request = MintRequest {
            item_id: state.item_id().clone(),
            token_uri: state.require_token_uri()?.to_string(),
            price: state.require_price()?,
            royalty: state.item.royalty,
            address: state.address.clone(),
        };
        debug!(item_id = %request.item_id, uri = %request.token_uri, "Submitting mint transaction");
        self.marketplace.mint(&request).await.map_err(Error::Chain)
    }
}

/// Turn the draft into an active item once the token exists.
pub struct ActivateItemCommand {
    items: Arc<dyn ItemService>,
}

impl ActivateItemCommand {
    pub fn new(items: Arc<dyn ItemService>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Command for ActivateItemCommand {
    type Output = Item;

    async fn execute(&self, state: &MarketplaceState) -> Result<Item> {
        let receipt = state.require_receipt()?;
        let token_id = receipt.token_id.ok_or_else(|| {
            Error::Validation(format!("mint receipt {} carries no token id", receipt.tx_hash))
        })?;
        let request = ActivateItemRequest {
            item_id: state.item_id().clone(),
            token_id,
            list_id: confirmed_list_id(receipt, state)?,
            price: confirmed_price(receipt)?,
            address: state.address.clone(),
        };
        self.items.activate(&request).await.map_err(Error::Index)
    }
}
