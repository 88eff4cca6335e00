//! Two-step orchestration: on-chain command first, index sync second.
//!
//! The index must never assert a status the chain has not confirmed, so
//! the order is fixed and the second step depends on the first one's
//! receipt. A chain failure leaves the index untouched. An index failure
//! after a confirmed transaction is reported as [`Error::Diverged`] and is
//! not retried here.

use crate::commands::{
    ActivateItemCommand, BuyItemCommand, ChainCommand, Command, DelistItemCommand, ListItemCommand,
    MintItemCommand, StoreBuyItemCommand, StoreDelistItemCommand, StoreListItemCommand,
};
use crate::error::ServiceError;
use crate::state::{Action, MarketplaceState};
use crate::{Error, Result};
use leda_types::Item;
use tracing::{error, info, warn};

pub type ListItemInvoker = Invoker<ListItemCommand, StoreListItemCommand>;
pub type BuyItemInvoker = Invoker<BuyItemCommand, StoreBuyItemCommand>;
pub type DelistItemInvoker = Invoker<DelistItemCommand, StoreDelistItemCommand>;
pub type MintItemInvoker = Invoker<MintItemCommand, ActivateItemCommand>;

pub struct Invoker<C, S> {
    action: Action,
    chain: C,
    sync: S,
}

impl<C, S> Invoker<C, S>
where
    C: ChainCommand,
    S: Command<Output = Item>,
{
    pub fn new(chain: C, sync: S) -> Self {
        Self {
            action: C::ACTION,
            chain,
            sync,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub async fn execute(&self, mut state: MarketplaceState) -> Result<MarketplaceState> {
        let action = self.action;
        action.validate(&state)?;

        info!(%action, item_id = %state.item_id(), address = %state.address, "Running marketplace action");

        let receipt = match self.chain.execute(&state).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(%action, item_id = %state.item_id(), error = %e, "On-chain step failed, index untouched");
                return Err(e);
            }
        };

        let tx_hash = receipt.tx_hash.clone();
        let confirmed_status = receipt.status;
        state.apply_receipt(receipt);

        let item = match self.sync.execute(&state).await {
            Ok(item) => item,
            Err(e) => return Err(self.diverged(&state, tx_hash, e)),
        };

        if item.status != confirmed_status {
            let reason = Error::Index(ServiceError::Rejected(format!(
                "index reported {:?}, chain confirmed {:?}",
                item.status, confirmed_status
            )));
            return Err(self.diverged(&state, tx_hash, reason));
        }
        if let Err(e) = item.check_invariant() {
            warn!(%action, item_id = %item.item_id, error = %e, "Index returned an inconsistent item");
        }

        info!(%action, item_id = %item.item_id, status = ?item.status, tx = %tx_hash, "Marketplace action confirmed");
        state.item = item;
        Ok(state)
    }

    fn diverged(&self, state: &MarketplaceState, tx_hash: String, reason: Error) -> Error {
        error!(
            action = %self.action,
            item_id = %state.item_id(),
            tx = %tx_hash,
            error = %reason,
            "Chain confirmed but index sync failed"
        );
        Error::Diverged {
            action: self.action,
            item_id: state.item_id().clone(),
            tx_hash,
            reason: Box::new(reason),
        }
    }
}
