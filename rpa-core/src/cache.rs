//! Bounded memo of summaries, evicted in insertion order.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::models::TaxSummary;

/// Default number of summaries kept by a [`SummaryCache`].
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Canonical identity of a summary request.
///
/// Decimal parts are normalized, so `5000` and `5000.00` build equal keys
/// with the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryKey {
    gross_amount: Decimal,
    dependents: u8,
    service_tax_rate: Decimal,
    include_service_tax: bool,
}

impl SummaryKey {
    pub fn new(
        gross_amount: Decimal,
        dependents: u8,
        service_tax_rate: Decimal,
        include_service_tax: bool,
    ) -> Self {
        Self {
            gross_amount: gross_amount.normalize(),
            dependents,
            service_tax_rate: service_tax_rate.normalize(),
            include_service_tax,
        }
    }
}

impl fmt::Display for SummaryKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.gross_amount, self.dependents, self.service_tax_rate, self.include_service_tax
        )
    }
}

/// Point-in-time counters for a [`SummaryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// FIFO-bounded map from [`SummaryKey`] to [`TaxSummary`].
///
/// Lookups never refresh an entry's position. A capacity of zero stores
/// nothing.
#[derive(Debug)]
pub struct SummaryCache {
    capacity: usize,
    entries: HashMap<SummaryKey, TaxSummary>,
    order: VecDeque<SummaryKey>,
    hits: u64,
    misses: u64,
}

impl SummaryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get(
        &mut self,
        key: &SummaryKey,
    ) -> Option<TaxSummary> {
        match self.entries.get(key) {
            Some(summary) => {
                self.hits += 1;
                debug!(key = %key, "summary cache hit");
                Some(summary.clone())
            }
            None => {
                self.misses += 1;
                debug!(key = %key, "summary cache miss");
                None
            }
        }
    }

    /// Stores `summary` unless `key` is already present, evicting the oldest
    /// entry when full.
    pub fn insert(
        &mut self,
        key: SummaryKey,
        summary: TaxSummary,
    ) {
        if self.capacity == 0 || self.entries.contains_key(&key) {
            return;
        }

        while self.order.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!(key = %oldest, "evicting oldest cached summary");
            self.entries.remove(&oldest);
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, summary);
    }

    /// Drops every entry and resets the hit and miss counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Canonical keys, oldest first.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().map(ToString::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            len: self.entries.len(),
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
        }
    }
}

impl Default for SummaryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
