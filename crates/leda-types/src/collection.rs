//! Collections and the paginated view over their items.

use crate::{Address, ImageRef, Item};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub owner: Address,
    #[serde(default)]
    pub image: ImageRef,
}

/// One page returned by a paginated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
    /// Total matching rows, when the source reports it.
    #[serde(default)]
    pub total: Option<u64>,
}

/// Query for a collection's items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsFilters {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ItemsFilters {
    pub fn first_page(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            page: self.page + 1,
            ..self.clone()
        }
    }
}

/// Query for the collections listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFilters {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl CollectionFilters {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            search: None,
        }
    }
}

/// Items loaded so far for the selected collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemsStats {
    pub items: Vec<Item>,
    /// Items requested so far (`page * page_limit`).
    pub limit: u32,
    pub page: u32,
    #[serde(default)]
    pub total: Option<u64>,
}

impl ItemsStats {
    /// Page 1 replaces the loaded items; later pages append.
    pub fn merge_page(&mut self, page: Page<Item>) {
        if page.page <= 1 {
            self.items = page.items;
        } else {
            self.items.extend(page.items);
        }
        self.page = page.page.max(1);
        self.limit = self.page.saturating_mul(page.limit);
        self.total = page.total;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDetail {
    pub collection: Collection,
    pub items_stats: ItemsStats,
    pub items_filters: ItemsFilters,
}

impl CollectionDetail {
    pub fn new(collection: Collection, page_limit: u32) -> Self {
        Self {
            collection,
            items_stats: ItemsStats::default(),
            items_filters: ItemsFilters::first_page(page_limit),
        }
    }
}
