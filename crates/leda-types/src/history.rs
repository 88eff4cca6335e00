use crate::{Address, ItemId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryKind {
    Mint,
    List,
    Delist,
    Buy,
    ChangePrice,
}

/// One confirmed transition of an item. Append-only, written by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub id: String,
    pub item_id: ItemId,
    pub kind: HistoryKind,
    /// Actor that triggered the transition.
    pub address: Address,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    /// Unix seconds.
    pub timestamp: u64,
}
