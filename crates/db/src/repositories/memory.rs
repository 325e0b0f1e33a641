//! In-memory repository implementations for tests and local wiring.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use savora_core::domain::dish::{Dish, DishId};
use savora_core::domain::favorite::Favorite;
use savora_core::domain::order::{OrderLineItem, OrderStatus};

use super::{
    CatalogRepository, FavoriteRepository, OrderHistoryRepository, PreferenceRepository,
    RepositoryError,
};

#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalogRepository {
    dishes: Vec<Dish>,
}

impl InMemoryCatalogRepository {
    pub fn new(dishes: Vec<Dish>) -> Self {
        Self { dishes }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn catalogue_snapshot(&self) -> Result<Vec<Dish>, RepositoryError> {
        Ok(self.dishes.clone())
    }

    async fn find_dish(&self, id: &DishId) -> Result<Option<Dish>, RepositoryError> {
        Ok(self.dishes.iter().find(|dish| &dish.id == id).cloned())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderHistoryRepository {
    lines_by_user: HashMap<String, Vec<OrderLineItem>>,
}

impl InMemoryOrderHistoryRepository {
    pub fn new(lines_by_user: HashMap<String, Vec<OrderLineItem>>) -> Self {
        Self { lines_by_user }
    }
}

#[async_trait]
impl OrderHistoryRepository for InMemoryOrderHistoryRepository {
    async fn history_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrderLineItem>, RepositoryError> {
        Ok(self.lines_by_user.get(user_id).cloned().unwrap_or_default())
    }

    async fn delivered_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<OrderLineItem>, RepositoryError> {
        Ok(self
            .lines_by_user
            .values()
            .flatten()
            .filter(|line| line.status == OrderStatus::Delivered && line.completed_at >= cutoff)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryFavoriteRepository {
    favorites_by_user: HashMap<String, Vec<Favorite>>,
}

impl InMemoryFavoriteRepository {
    pub fn new(favorites_by_user: HashMap<String, Vec<Favorite>>) -> Self {
        Self { favorites_by_user }
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryFavoriteRepository {
    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, RepositoryError> {
        Ok(self.favorites_by_user.get(user_id).cloned().unwrap_or_default())
    }
}

#[derive(Clone, Debug, Default)]
pub struct InMemoryPreferenceRepository {
    preferences_by_user: HashMap<String, BTreeSet<String>>,
}

impl InMemoryPreferenceRepository {
    pub fn new(preferences_by_user: HashMap<String, BTreeSet<String>>) -> Self {
        Self { preferences_by_user }
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryPreferenceRepository {
    async fn preferences_for_user(
        &self,
        user_id: &str,
    ) -> Result<BTreeSet<String>, RepositoryError> {
        Ok(self.preferences_by_user.get(user_id).cloned().unwrap_or_default())
    }
}
