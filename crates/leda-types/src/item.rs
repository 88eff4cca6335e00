//! Marketplace item and its status machine.
//!
//! Items are never deleted; every change is a status transition that
//! returns a new `Item`. The invariant tying status to price:
//!
//! - `Listed` always carries a price.
//! - `Draft` and `Lazy` never carry one.
//! - `Delisted` and `Sold` keep the last known price.

use crate::{Address, ItemError, ItemId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    /// Stored in the index, not yet minted.
    #[default]
    Draft,
    /// Lazily minted: signed voucher only, minted on first purchase.
    Lazy,
    Listed,
    #[serde(rename = "NotListed")]
    Delisted,
    Sold,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: ItemId,
    #[serde(default)]
    pub token_id: Option<u64>,
    /// Marketplace listing id assigned by the contract.
    #[serde(default)]
    pub list_id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: ImageRef,
    pub owner: Address,
    pub author: Address,
    /// ETH. `None` for items that were never listed.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub likes: u32,
    /// Percentage paid to the author on secondary sales.
    #[serde(default)]
    pub royalty: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collection_id: Option<String>,
    pub status: ItemStatus,
}

impl Item {
    /// A fresh draft owned by its author.
    pub fn draft(item_id: impl Into<ItemId>, author: impl Into<Address>, name: impl Into<String>) -> Self {
        let author = author.into();
        Self {
            item_id: item_id.into(),
            name: name.into(),
            owner: author.clone(),
            author,
            status: ItemStatus::Draft,
            ..Default::default()
        }
    }

    pub fn is_listed(&self) -> bool {
        self.status == ItemStatus::Listed
    }

    /// Price used for range filtering. Unpriced items count as zero.
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    pub fn check_invariant(&self) -> Result<(), ItemError> {
        match self.status {
            ItemStatus::Listed if self.price.is_none() => {
                Err(ItemError::MissingPrice(self.item_id.clone()))
            }
            ItemStatus::Draft | ItemStatus::Lazy if self.price.is_some() => {
                Err(ItemError::UnexpectedPrice(self.item_id.clone()))
            }
            _ => Ok(()),
        }
    }

    // --- Transitions ---

    pub fn list(&self, price: f64, list_id: u64) -> Result<Self, ItemError> {
        self.expect_status(&[ItemStatus::Draft, ItemStatus::Delisted, ItemStatus::Sold], "list")?;
        validate_price(price)?;
        Ok(Self {
            price: Some(price),
            list_id: Some(list_id),
            status: ItemStatus::Listed,
            ..self.clone()
        })
    }

    pub fn change_price(&self, price: f64) -> Result<Self, ItemError> {
        self.expect_status(&[ItemStatus::Listed], "change the price of")?;
        validate_price(price)?;
        Ok(Self {
            price: Some(price),
            ..self.clone()
        })
    }

    pub fn delist(&self) -> Result<Self, ItemError> {
        self.expect_status(&[ItemStatus::Listed], "delist")?;
        Ok(Self {
            status: ItemStatus::Delisted,
            ..self.clone()
        })
    }

    pub fn sell(&self, buyer: &Address) -> Result<Self, ItemError> {
        self.expect_status(&[ItemStatus::Listed], "buy")?;
        Ok(Self {
            owner: buyer.clone(),
            status: ItemStatus::Sold,
            ..self.clone()
        })
    }

    /// Mint and list in one step (`makeItem` on the contract).
    pub fn activate(&self, token_id: u64, price: f64, list_id: u64) -> Result<Self, ItemError> {
        self.expect_status(&[ItemStatus::Draft], "activate")?;
        validate_price(price)?;
        Ok(Self {
            token_id: Some(token_id),
            list_id: Some(list_id),
            price: Some(price),
            status: ItemStatus::Listed,
            ..self.clone()
        })
    }

    /// A lazy item becomes a real token once its voucher is redeemed.
    pub fn redeem_lazy(&self, buyer: &Address, token_id: u64, price: f64) -> Result<Self, ItemError> {
        self.expect_status(&[ItemStatus::Lazy], "redeem")?;
        validate_price(price)?;
        Ok(Self {
            token_id: Some(token_id),
            owner: buyer.clone(),
            price: Some(price),
            status: ItemStatus::Sold,
            ..self.clone()
        })
    }

    pub fn like(&self) -> Self {
        Self {
            likes: self.likes.saturating_add(1),
            ..self.clone()
        }
    }

    fn expect_status(&self, allowed: &[ItemStatus], action: &'static str) -> Result<(), ItemError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(ItemError::InvalidTransition {
                item_id: self.item_id.clone(),
                from: self.status,
                action,
            })
        }
    }
}

fn validate_price(price: f64) -> Result<(), ItemError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(ItemError::InvalidPrice(price))
    }
}
