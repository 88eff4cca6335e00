//! # Leda Marketplace
//!
//! Client core for an NFT marketplace. Every user action (list, buy,
//! delist, mint) runs as a two-step pipeline: a command that confirms the
//! transaction on chain, then a command that records the result in the
//! off-chain index. A failed chain step leaves the index untouched; a
//! failed index step after a confirmed transaction is reported as
//! [`Error::Diverged`].
//!
//! ## Quick Start
//! ```bash
//! LEDA_INDEX_URL=http://localhost:3000/api/v1 cargo run --bin leda-reconcile
//! ```
//!
//! ## Layout
//! - [`commands`] and [`invoker`] - the two-step pipeline
//! - [`client`] - one facade per marketplace action
//! - [`store`] - slices, async actions and memoized selectors
//! - [`memory`] / `http` - service adapters

pub mod cache;
pub mod client;
pub mod commands;
pub mod config;
mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod invoker;
pub mod memory;
pub mod selection;
pub mod services;
pub mod state;
pub mod store;

pub use client::{BuyItemClient, DelistItemClient, ListItemClient, MintClient};
pub use config::Config;
pub use error::{Error, Result, ServiceError};
pub use services::Services;
pub use state::{Action, ChainReceipt, MarketplaceState};
pub use store::Store;
