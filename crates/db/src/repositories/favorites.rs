use std::str::FromStr;

use sqlx::Row;

use savora_core::domain::dish::{DishCategory, DishId};
use savora_core::domain::favorite::Favorite;

use super::{FavoriteRepository, RepositoryError};
use crate::DbPool;

pub struct SqlFavoriteRepository {
    pool: DbPool,
}

impl SqlFavoriteRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FavoriteRepository for SqlFavoriteRepository {
    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT dish_id, category FROM favorite WHERE user_id = ? ORDER BY created_at, dish_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let dish_id: String = row.try_get("dish_id")?;
                let category_label: String = row.try_get("category")?;
                let category = DishCategory::from_str(&category_label).map_err(|error| {
                    RepositoryError::Decode(format!("favorite `{dish_id}`: {error}"))
                })?;
                Ok(Favorite { dish_id: DishId(dish_id), category })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use savora_core::domain::dish::DishCategory;

    use super::super::FavoriteRepository;
    use super::SqlFavoriteRepository;
    use crate::{connect_with_settings, migrations};

    #[tokio::test]
    async fn favorites_decode_their_captured_category() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        sqlx::query(
            "INSERT INTO favorite (user_id, dish_id, category) VALUES ('user-maya', 'dish-a', 'dessert')",
        )
        .execute(&pool)
        .await
        .expect("insert favorite");

        let repository = SqlFavoriteRepository::new(pool.clone());
        let favorites = repository.favorites_for_user("user-maya").await.expect("favorites");

        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].dish_id.0, "dish-a");
        assert_eq!(favorites[0].category, DishCategory::Dessert);

        pool.close().await;
    }
}
