use crate::{ItemId, ItemStatus};

/// Data-model error: a transition the status machine does not allow, or
/// an item whose price contradicts its status.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemError {
    InvalidTransition {
        item_id: ItemId,
        from: ItemStatus,
        action: &'static str,
    },
    InvalidPrice(f64),
    /// Listed without a price.
    MissingPrice(ItemId),
    /// Draft or lazy item carrying a price.
    UnexpectedPrice(ItemId),
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition {
                item_id,
                from,
                action,
            } => write!(f, "cannot {action} item {item_id} in status {from:?}"),
            Self::InvalidPrice(price) => write!(f, "invalid price: {price}"),
            Self::MissingPrice(id) => write!(f, "item {id} is listed without a price"),
            Self::UnexpectedPrice(id) => write!(f, "item {id} carries a price before listing"),
        }
    }
}

impl std::error::Error for ItemError {}
