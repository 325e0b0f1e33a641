use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::favorite::Favorite;
use crate::domain::order::OrderLineItem;

/// Per-user behavioral snapshot consumed by the scoring engine. Assembled by
/// the accessors once per request; the engine never refreshes it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopperProfile {
    pub order_history: Vec<OrderLineItem>,
    pub favorites: Vec<Favorite>,
    pub dietary_preferences: BTreeSet<String>,
}

impl ShopperProfile {
    pub fn new(
        order_history: Vec<OrderLineItem>,
        favorites: Vec<Favorite>,
        dietary_preferences: BTreeSet<String>,
    ) -> Self {
        Self { order_history, favorites, dietary_preferences }
    }
}
