//! Per-invocation marketplace state passed through one invoker run.

use crate::{Error, Result};
use leda_types::{Address, Item, ItemId, ItemStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace action driven by an invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Buy,
    Delist,
    Mint,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::List => "list",
            Action::Buy => "buy",
            Action::Delist => "delist",
            Action::Mint => "mint",
        };
        f.write_str(name)
    }
}

impl Action {
    /// Check the state carries what the on-chain command needs.
    pub fn validate(&self, state: &MarketplaceState) -> Result<()> {
        if state.item.item_id.is_empty() {
            return Err(Error::Validation(format!("{self}: missing item id")));
        }
        if state.address.is_empty() {
            return Err(Error::Validation(format!("{self}: missing address")));
        }
        match self {
            Action::List => {
                state.require_price()?;
                state.require_list_id()?;
            }
            // The contract charges the listed price.
            Action::Buy => {
                if state.item.price.is_none() {
                    return Err(Error::Validation(format!(
                        "buy: item {} has no price",
                        state.item.item_id
                    )));
                }
            }
            Action::Delist => {}
            Action::Mint => {
                if state.item.status != ItemStatus::Draft {
                    return Err(Error::Validation(format!(
                        "mint: item {} is {:?}, expected Draft",
                        state.item.item_id, state.item.status
                    )));
                }
                state.require_price()?;
                state.require_token_uri()?;
            }
        }
        Ok(())
    }
}

/// Fields confirmed by a mined transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReceipt {
    pub item_id: ItemId,
    pub status: ItemStatus,
    pub price: Option<f64>,
    pub owner: Address,
    #[serde(default)]
    pub token_id: Option<u64>,
    #[serde(default)]
    pub list_id: Option<u64>,
    pub tx_hash: String,
}

/// Transient aggregate owned by a single invoker run.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketplaceState {
    pub item: Item,
    /// Wallet submitting the transaction.
    pub address: Address,
    pub requested_price: Option<f64>,
    pub list_id: Option<u64>,
    /// Metadata URI for minting.
    pub token_uri: Option<String>,
    /// Set once the on-chain command succeeded.
    pub receipt: Option<ChainReceipt>,
}

impl MarketplaceState {
    pub fn new(item: Item, address: impl Into<Address>) -> Self {
        Self {
            item,
            address: address.into(),
            requested_price: None,
            list_id: None,
            token_uri: None,
            receipt: None,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.requested_price = Some(price);
        self
    }

    pub fn with_list_id(mut self, list_id: u64) -> Self {
        self.list_id = Some(list_id);
        self
    }

    pub fn with_token_uri(mut self, uri: impl Into<String>) -> Self {
        self.token_uri = Some(uri.into());
        self
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item.item_id
    }

    pub fn require_price(&self) -> Result<f64> {
        match self.requested_price {
            Some(price) if price.is_finite() && price > 0.0 => Ok(price),
            Some(price) => Err(Error::Validation(format!("invalid price: {price}"))),
            None => Err(Error::Validation("missing price".into())),
        }
    }

    pub fn require_list_id(&self) -> Result<u64> {
        self.list_id
            .ok_or_else(|| Error::Validation("missing list id".into()))
    }

    pub fn require_token_uri(&self) -> Result<&str> {
        match self.token_uri.as_deref() {
            Some(uri) if !uri.trim().is_empty() => Ok(uri),
            _ => Err(Error::Validation("missing token uri".into())),
        }
    }

    pub fn require_receipt(&self) -> Result<&ChainReceipt> {
        self.receipt
            .as_ref()
            .ok_or_else(|| Error::Validation("index sync requires a chain receipt".into()))
    }

    /// Merge chain-confirmed fields into the item.
    pub fn apply_receipt(&mut self, receipt: ChainReceipt) {
        self.item.status = receipt.status;
        self.item.price = receipt.price;
        self.item.owner = receipt.owner.clone();
        if receipt.token_id.is_some() {
            self.item.token_id = receipt.token_id;
        }
        if receipt.list_id.is_some() {
            self.item.list_id = receipt.list_id;
        }
        self.receipt = Some(receipt);
    }
}
