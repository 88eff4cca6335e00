use super::{AsyncOutcome, Rejection, StoreAction};
use leda_types::{Collection, CollectionDetail, CollectionFilters, Item, ItemsStats};
use tracing::warn;

#[derive(Debug)]
pub struct CollectionsSlice {
    collections: Vec<Collection>,
    /// Total reported by the last filtered query.
    collections_total: Option<u64>,
    selected: Option<CollectionDetail>,
    collections_filters: CollectionFilters,
    is_loading: bool,
    last_error: Option<Rejection>,
    page_limit: u32,
}

impl CollectionsSlice {
    pub fn new(page_limit: u32) -> Self {
        Self {
            collections: Vec::new(),
            collections_total: None,
            selected: None,
            collections_filters: CollectionFilters::with_limit(page_limit),
            is_loading: false,
            last_error: None,
            page_limit,
        }
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collections_total(&self) -> Option<u64> {
        self.collections_total
    }

    pub fn selected(&self) -> Option<&CollectionDetail> {
        self.selected.as_ref()
    }

    pub fn collections_filters(&self) -> &CollectionFilters {
        &self.collections_filters
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&Rejection> {
        self.last_error.as_ref()
    }

    pub(crate) fn reduce(&mut self, action: &StoreAction) {
        match action {
            StoreAction::FindAllCollections(outcome) => {
                self.settle(outcome, |slice, collections| {
                    slice.collections = collections.clone();
                    slice.collections_total = None;
                })
            }
            StoreAction::FindFilteredCollections(outcome) => self.settle(outcome, |slice, page| {
                if page.page <= 1 {
                    slice.collections = page.items.clone();
                } else {
                    slice.collections.extend(page.items.iter().cloned());
                }
                slice.collections_total = page.total;
            }),
            StoreAction::FindCollectionById(outcome) => self.settle(outcome, |slice, collection| {
                let page_limit = slice.page_limit;
                if let Some(detail) = slice
                    .selected
                    .as_mut()
                    .filter(|detail| detail.collection.id == collection.id)
                {
                    detail.collection = collection.clone();
                } else {
                    slice.selected = Some(CollectionDetail::new(collection.clone(), page_limit));
                }
            }),
            StoreAction::FindPagedItems(outcome) => self.settle(outcome, |slice, page| {
                match slice.selected.as_mut() {
                    Some(detail) => detail.items_stats.merge_page(page.clone()),
                    None => warn!("Received a collection page with no collection selected"),
                }
            }),
            StoreAction::SetItemsFilters(filters) => {
                if let Some(detail) = self.selected.as_mut() {
                    detail.items_filters = filters.clone();
                    detail.items_filters.page = 1;
                    detail.items_stats = ItemsStats::default();
                }
            }
            StoreAction::NextItemsPage => {
                if let Some(detail) = self.selected.as_mut() {
                    detail.items_filters = detail.items_filters.next_page();
                }
            }
            StoreAction::SetCollectionsFilters(filters) => {
                self.collections_filters = filters.clone();
            }
            StoreAction::ResetCollectionsFilters => {
                self.collections_filters = CollectionFilters::with_limit(self.page_limit);
            }
            // Keep the selected collection's rows in step with marketplace actions.
            StoreAction::BuyItem(AsyncOutcome::Fulfilled(item))
            | StoreAction::ListItem(AsyncOutcome::Fulfilled(item))
            | StoreAction::DelistItem(AsyncOutcome::Fulfilled(item))
            | StoreAction::LikeItem(AsyncOutcome::Fulfilled(item)) => self.refresh_item(item),
            _ => {}
        }
    }

    fn settle<T>(&mut self, outcome: &AsyncOutcome<T>, on_fulfilled: impl FnOnce(&mut Self, &T)) {
        match outcome {
            AsyncOutcome::Pending => {
                self.is_loading = true;
                self.last_error = None;
            }
            AsyncOutcome::Fulfilled(payload) => {
                on_fulfilled(self, payload);
                self.is_loading = false;
            }
            AsyncOutcome::Rejected(rejection) => {
                self.last_error = Some(rejection.clone());
                self.is_loading = false;
            }
        }
    }

    fn refresh_item(&mut self, item: &Item) {
        if let Some(detail) = self.selected.as_mut() {
            if let Some(row) = detail
                .items_stats
                .items
                .iter_mut()
                .find(|row| row.item_id == item.item_id)
            {
                *row = item.clone();
            }
        }
    }
}
