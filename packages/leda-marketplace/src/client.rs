//! Per-action facades. Each wires one invoker with the shared services for
//! a single invocation and exposes `execute()`.
//!
//! ```ignore
//! let result = ListItemClient::new(&services, state).execute().await?;
//! ```

use crate::commands::{
    ActivateItemCommand, BuyItemCommand, DelistItemCommand, ListItemCommand, MintItemCommand,
    StoreBuyItemCommand, StoreDelistItemCommand, StoreListItemCommand,
};
use crate::invoker::{BuyItemInvoker, DelistItemInvoker, Invoker, ListItemInvoker, MintItemInvoker};
use crate::services::Services;
use crate::state::MarketplaceState;
use crate::Result;

macro_rules! marketplace_client {
    ($(#[$doc:meta])* $name:ident, $invoker:ty, $chain:ident, $sync:ident) => {
        $(#[$doc])*
        pub struct $name {
            state: MarketplaceState,
            invoker: $invoker,
        }

        impl $name {
            pub fn new(services: &Services, state: MarketplaceState) -> Self {
                let invoker = Invoker::new(
                    $chain::new(services.marketplace.clone()),
                    $sync::new(services.items.clone()),
                );
                Self { state, invoker }
            }

            pub async fn execute(self) -> Result<MarketplaceState> {
                self.invoker.execute(self.state).await
            }
        }
    };
}

marketplace_client!(
    /// List an item for sale at `state.requested_price`.
    ListItemClient,
    ListItemInvoker,
    ListItemCommand,
    StoreListItemCommand
);

marketplace_client!(
    BuyItemClient,
    BuyItemInvoker,
    BuyItemCommand,
    StoreBuyItemCommand
);

marketplace_client!(
    DelistItemClient,
    DelistItemInvoker,
    DelistItemCommand,
    StoreDelistItemCommand
);

marketplace_client!(
    /// Mint a drafted item and list it at `state.requested_price`.
    MintClient,
    MintItemInvoker,
    MintItemCommand,
    ActivateItemCommand
);
