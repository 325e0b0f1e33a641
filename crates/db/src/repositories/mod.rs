use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use savora_core::domain::dish::{Dish, DishId};
use savora_core::domain::favorite::Favorite;
use savora_core::domain::order::OrderLineItem;

pub mod catalog;
pub mod favorites;
pub mod memory;
pub mod orders;
pub mod preferences;

pub use catalog::SqlCatalogRepository;
pub use favorites::SqlFavoriteRepository;
pub use memory::{
    InMemoryCatalogRepository, InMemoryFavoriteRepository, InMemoryOrderHistoryRepository,
    InMemoryPreferenceRepository,
};
pub use orders::SqlOrderHistoryRepository;
pub use preferences::SqlPreferenceRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Read-only view over the dish catalogue. Snapshots are normalized here so
/// the engines never see legacy column quirks.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn catalogue_snapshot(&self) -> Result<Vec<Dish>, RepositoryError>;
    async fn find_dish(&self, id: &DishId) -> Result<Option<Dish>, RepositoryError>;
}

/// Read-only view over historical order line items.
#[async_trait]
pub trait OrderHistoryRepository: Send + Sync {
    async fn history_for_user(&self, user_id: &str) -> Result<Vec<OrderLineItem>, RepositoryError>;

    /// Delivered line items completed on or after `cutoff`, across all
    /// users. Feeds the trending window.
    async fn delivered_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<OrderLineItem>, RepositoryError>;
}

/// Read-only view over explicit favorites.
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, RepositoryError>;
}

/// Read-only view over a user's dietary preference tags.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    async fn preferences_for_user(
        &self,
        user_id: &str,
    ) -> Result<BTreeSet<String>, RepositoryError>;
}
