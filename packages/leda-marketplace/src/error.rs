//! Error types for the marketplace core.

use crate::state::Action;
use leda_types::{ItemError, ItemId};
use std::fmt;

/// Failure reported by a service adapter (chain or index).
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Wallet rejection, reverted transaction, or a refused index write.
    Rejected(String),
    /// Node, network or timeout failure.
    Unavailable(String),
    NotFound(String),
    /// Response could not be decoded.
    Decode(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Rejected(msg) => write!(f, "rejected: {msg}"),
            ServiceError::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            ServiceError::NotFound(msg) => write!(f, "not found: {msg}"),
            ServiceError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ItemError> for ServiceError {
    fn from(err: ItemError) -> Self {
        ServiceError::Rejected(err.to_string())
    }
}

/// Marketplace core error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Missing or malformed input, raised before any side effect.
    Validation(String),
    /// The on-chain step failed. Nothing was written to the index.
    Chain(ServiceError),
    /// An index read or write failed.
    Index(ServiceError),
    /// The chain confirmed the action but the index did not follow.
    Diverged {
        action: Action,
        item_id: ItemId,
        tx_hash: String,
        reason: Box<Error>,
    },
    /// Lookup in the local snapshot found nothing.
    NotFound(String),
    /// Configuration error.
    Config(String),
}

impl Error {
    /// True when the chain and the index disagree and a reconciliation read
    /// is needed.
    pub fn is_diverged(&self) -> bool {
        matches!(self, Error::Diverged { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(msg) => write!(f, "validation error: {msg}"),
            Error::Chain(err) => write!(f, "chain error: {err}"),
            Error::Index(err) => write!(f, "index error: {err}"),
            Error::Diverged {
                action,
                item_id,
                tx_hash,
                reason,
            } => write!(
                f,
                "state diverged: {action} of item {item_id} confirmed in tx {tx_hash} but index sync failed ({reason})"
            ),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ItemError> for Error {
    fn from(err: ItemError) -> Self {
        Error::Validation(err.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
