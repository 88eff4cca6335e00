//! Derived views over an item snapshot. Every function is pure.

use crate::{Error, Result};
use leda_types::{Address, Item, ItemId, ItemsStats};

/// Sentinel the UI sends for "no filter".
const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    Expensive,
    Cheapest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LikesDirection {
    Asc,
    Desc,
}

/// Marketplace filter form. `None` skips the predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilters {
    /// Exact match on the owner address.
    pub author: Option<Address>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price_from: Option<f64>,
    pub price_to: Option<f64>,
    pub likes: Option<LikesDirection>,
}

/// Hashable identity of an [`ItemFilters`], used as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterKey {
    author: Option<Address>,
    title: Option<String>,
    description: Option<String>,
    price_from: Option<u64>,
    price_to: Option<u64>,
    likes: Option<LikesDirection>,
}

impl ItemFilters {
    /// Build from the raw form values, where `"all"` (or empty) means
    /// "no filter" and a negative price disables the range.
    pub fn from_query(
        author: &str,
        title: &str,
        description: &str,
        price_from: f64,
        price_to: f64,
        likes: &str,
    ) -> Self {
        fn field(value: &str) -> Option<String> {
            if value.is_empty() || value == ALL {
                None
            } else {
                Some(value.to_string())
            }
        }

        Self {
            author: field(author).map(Address::from),
            title: field(title),
            description: field(description),
            price_from: Some(price_from),
            price_to: Some(price_to),
            likes: match likes {
                "asc" => Some(LikesDirection::Asc),
                "desc" => Some(LikesDirection::Desc),
                _ => None,
            },
        }
    }

    pub fn with_price_range(mut self, from: f64, to: f64) -> Self {
        self.price_from = Some(from);
        self.price_to = Some(to);
        self
    }

    /// Inclusive range, only when `from >= 0 && to >= from`.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        match (self.price_from, self.price_to) {
            (Some(from), Some(to)) if from >= 0.0 && to >= from => Some((from, to)),
            _ => None,
        }
    }

    pub fn key(&self) -> FilterKey {
        FilterKey {
            author: self.author.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            price_from: self.price_from.map(f64::to_bits),
            price_to: self.price_to.map(f64::to_bits),
            likes: self.likes,
        }
    }
}

/// Highest or lowest listed price. `None` when no item carries a price,
/// never a made-up zero.
pub fn select_costed_item(items: &[Item], cost: Cost) -> Option<f64> {
    let prices = items.iter().filter_map(|item| item.price).filter(|p| !p.is_nan());
    match cost {
        Cost::Expensive => prices.reduce(f64::max),
        Cost::Cheapest => prices.reduce(f64::min),
    }
}

/// Apply the filter predicates in order (owner, name, description, price
/// range), then sort by likes. The sort is stable.
pub fn select_filtered_items(items: &[Item], filters: &ItemFilters) -> Vec<Item> {
    let title = filters.title.as_ref().map(|t| t.to_lowercase());
    let description = filters.description.as_ref().map(|d| d.to_lowercase());
    let range = filters.price_range();

    let mut filtered: Vec<Item> = items
        .iter()
        .filter(|item| filters.author.as_ref().map_or(true, |a| &item.owner == a))
        .filter(|item| {
            title
                .as_deref()
                .map_or(true, |t| item.name.to_lowercase().contains(t))
        })
        .filter(|item| {
            description
                .as_deref()
                .map_or(true, |d| item.description.to_lowercase().contains(d))
        })
        .filter(|item| {
            range.map_or(true, |(from, to)| {
                let price = item.price_or_zero();
                price >= from && price <= to
            })
        })
        .cloned()
        .collect();

    match filters.likes {
        Some(LikesDirection::Asc) => filtered.sort_by_key(|item| item.likes),
        Some(LikesDirection::Desc) => filtered.sort_by_key(|item| std::cmp::Reverse(item.likes)),
        None => {}
    }
    filtered
}

/// The first `n` items of the snapshot (the index returns newest first).
pub fn select_newest(items: &[Item], n: usize) -> &[Item] {
    &items[..n.min(items.len())]
}

pub fn select_by_id<'a>(items: &'a [Item], item_id: &ItemId) -> Result<&'a Item> {
    items
        .iter()
        .find(|item| &item.item_id == item_id)
        .ok_or_else(|| Error::NotFound(format!("item {item_id}")))
}

/// "Load more" heuristic: true while the last page came back full.
///
/// This is an approximation. A final page holding exactly `limit` items
/// still reports more available; [`has_more`] corrects that when the source
/// reports a total. Before the first page arrives there is no "more".
pub fn more_available(stats: &ItemsStats) -> bool {
    stats.page > 0 && stats.items.len() as u64 >= u64::from(stats.limit)
}

pub fn has_more(stats: &ItemsStats) -> bool {
    if stats.page == 0 {
        return false;
    }
    match stats.total {
        Some(total) => (stats.items.len() as u64) < total,
        None => more_available(stats),
    }
}
