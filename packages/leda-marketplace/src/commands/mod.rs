//! Single-step commands. Each wraps exactly one service call.
//!
//! Every action has an on-chain command (output: [`ChainReceipt`]) and an
//! index-sync command that mirrors the confirmed fields into the index
//! (output: the updated [`Item`](leda_types::Item)).

mod buy;
mod delist;
mod list;
mod mint;

pub use buy::{BuyItemCommand, StoreBuyItemCommand};
pub use delist::{DelistItemCommand, StoreDelistItemCommand};
pub use list::{ListItemCommand, StoreListItemCommand};
pub use mint::{ActivateItemCommand, MintItemCommand};

use crate::state::{Action, ChainReceipt, MarketplaceState};
use crate::{Error, Result};
use async_trait::async_trait;

#[async_trait]
pub trait Command: Send + Sync {
    type Output: Send;

    async fn execute(&self, state: &MarketplaceState) -> Result<Self::Output>;
}

/// The on-chain half of an action. The action it performs is fixed by the
/// command type, so an invoker cannot be labelled with the wrong one.
pub trait ChainCommand: Command<Output = ChainReceipt> {
    const ACTION: Action;
}

fn confirmed_price(receipt: &ChainReceipt) -> Result<f64> {
    receipt.price.ok_or_else(|| {
        Error::Validation(format!(
            "receipt {} for item {} carries no price",
            receipt.tx_hash, receipt.item_id
        ))
    })
}

fn confirmed_list_id(receipt: &ChainReceipt, state: &MarketplaceState) -> Result<u64> {
    receipt
        .list_id
        .or(state.list_id)
        .ok_or_else(|| Error::Validation(format!("receipt {} carries no list id", receipt.tx_hash)))
}
