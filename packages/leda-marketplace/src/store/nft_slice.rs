use super::{AsyncOutcome, Rejection, StoreAction};
use leda_types::{History, Item};
use tracing::warn;

/// Items known to the client, plus the history of the item being viewed.
#[derive(Debug, Default)]
pub struct NftSlice {
    items: Vec<Item>,
    history: Vec<History>,
    is_loading: bool,
    last_error: Option<Rejection>,
    /// Bumped on every change to `items`; keys the filter cache.
    generation: u64,
}

impl NftSlice {
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn history(&self) -> &[History] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&Rejection> {
        self.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn reduce(&mut self, action: &StoreAction) {
        match action {
            StoreAction::FindAll(outcome) => self.settle(outcome, true, |slice, items| {
                slice.items = items.clone();
                slice.generation += 1;
            }),
            StoreAction::FindById(outcome) => {
                self.settle(outcome, false, |slice, item| slice.upsert(item))
            }
            StoreAction::FindHistory(outcome) => {
                self.settle(outcome, false, |slice, history| slice.history = history.clone())
            }
            StoreAction::BuyItem(outcome)
            | StoreAction::ListItem(outcome)
            | StoreAction::DelistItem(outcome)
            | StoreAction::MintNft(outcome)
            | StoreAction::ProcessLazyItem(outcome) => {
                self.settle(outcome, true, |slice, item| slice.upsert(item))
            }
            StoreAction::LikeItem(outcome) => {
                self.settle(outcome, false, |slice, item| slice.upsert(item))
            }
            _ => {}
        }
    }

    fn settle<T>(
        &mut self,
        outcome: &AsyncOutcome<T>,
        tracks_loading: bool,
        on_fulfilled: impl FnOnce(&mut Self, &T),
    ) {
        // Untracked actions leave the loading flag and earlier errors alone.
        match outcome {
            AsyncOutcome::Pending => {
                if tracks_loading {
                    self.last_error = None;
                    self.is_loading = true;
                }
            }
            AsyncOutcome::Fulfilled(payload) => {
                on_fulfilled(self, payload);
                if tracks_loading {
                    self.is_loading = false;
                }
            }
            AsyncOutcome::Rejected(rejection) => {
                self.last_error = Some(rejection.clone());
                if tracks_loading {
                    self.is_loading = false;
                }
            }
        }
    }

    fn upsert(&mut self, item: &Item) {
        if let Err(e) = item.check_invariant() {
            warn!(item_id = %item.item_id, error = %e, "Storing item that violates the status invariant");
        }
        match self.items.iter_mut().find(|i| i.item_id == item.item_id) {
            Some(existing) => *existing = item.clone(),
            None => self.items.push(item.clone()),
        }
        self.generation += 1;
    }
}
