//! Memoized filter results, keyed by snapshot generation and filter key.

use crate::selection::{select_filtered_items, FilterKey, ItemFilters};
use leda_types::Item;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Small FIFO cache for [`select_filtered_items`].
///
/// Entries belong to one snapshot generation; a different generation
/// clears the cache before lookup. Capacity 0 disables caching.
pub struct FilterCache {
    capacity: usize,
    generation: u64,
    entries: HashMap<FilterKey, Arc<Vec<Item>>>,
    order: VecDeque<FilterKey>,
    hits: u64,
    misses: u64,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            generation: 0,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_compute(
        &mut self,
        generation: u64,
        items: &[Item],
        filters: &ItemFilters,
    ) -> Arc<Vec<Item>> {
        if generation != self.generation {
            self.entries.clear();
            self.order.clear();
            self.generation = generation;
        }

        let key = filters.key();
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(hit);
        }

        self.misses += 1;
        let computed = Arc::new(select_filtered_items(items, filters));
        if self.capacity == 0 {
            return computed;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, Arc::clone(&computed));
        computed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
