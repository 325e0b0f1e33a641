//! Trending ranking over a trailing order window
//!
//! Aggregates delivered line items into per-dish quantity counts over a
//! trailing window and ranks dishes by volume. An empty window degrades to
//! catalogue order rather than an empty list.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::domain::dish::{Dish, DishId};
use crate::domain::order::{OrderLineItem, OrderStatus};

/// Trailing aggregation period when the caller does not configure one.
pub const DEFAULT_TRENDING_WINDOW_DAYS: i64 = 7;

/// Result size when the caller does not ask for one.
pub const DEFAULT_TRENDING_LIMIT: usize = 8;

/// Per-dish delivered quantities inside one trailing window. Recomputed on
/// every request; never cached across requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrendingWindow {
    counts: HashMap<DishId, u64>,
}

impl TrendingWindow {
    /// Accumulate delivered line items completed on or after the window
    /// cutoff. Everything else (pending, cancelled, too old) is ignored.
    pub fn from_line_items(
        orders: &[OrderLineItem],
        now: DateTime<Utc>,
        window_days: i64,
    ) -> Self {
        let cutoff = now - Duration::days(window_days.max(1));

        let mut counts: HashMap<DishId, u64> = HashMap::new();
        for line in orders {
            if line.status != OrderStatus::Delivered || line.completed_at < cutoff {
                continue;
            }
            *counts.entry(line.dish_id.clone()).or_insert(0) += u64::from(line.quantity);
        }

        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, dish_id: &DishId) -> u64 {
        self.counts.get(dish_id).copied().unwrap_or(0)
    }

    /// Dish ids ranked by delivered quantity descending. Count ties break on
    /// dish id so identical inputs always rank identically.
    pub fn ranked_ids(&self) -> Vec<(DishId, u64)> {
        let mut ranked: Vec<(DishId, u64)> =
            self.counts.iter().map(|(id, count)| (id.clone(), *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TrendingAggregator;

impl TrendingAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Up to `limit` dishes ranked by delivered quantity within the trailing
    /// window. Ids no longer in the catalogue are silently dropped, so the
    /// result may come up short. A window with no qualifying line items
    /// falls back to the first `limit` in-stock dishes in catalogue order.
    pub fn trending_dishes(
        &self,
        orders: &[OrderLineItem],
        catalog: &[Dish],
        now: DateTime<Utc>,
        window_days: i64,
        limit: Option<usize>,
    ) -> Vec<Dish> {
        let limit = limit.unwrap_or(DEFAULT_TRENDING_LIMIT).max(1);
        let window = TrendingWindow::from_line_items(orders, now, window_days);

        if window.is_empty() {
            return catalog.iter().filter(|dish| dish.in_stock()).take(limit).cloned().collect();
        }

        let by_id: HashMap<&DishId, &Dish> =
            catalog.iter().map(|dish| (&dish.id, dish)).collect();

        window
            .ranked_ids()
            .into_iter()
            .take(limit)
            .filter_map(|(dish_id, _)| by_id.get(&dish_id).map(|dish| (*dish).clone()))
            .collect()
    }
}
