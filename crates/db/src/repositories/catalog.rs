use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use savora_core::domain::dish::{Dish, DishCategory, DishId};

use super::{CatalogRepository, RepositoryError};
use crate::DbPool;

pub struct SqlCatalogRepository {
    pool: DbPool,
}

impl SqlCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const DISH_COLUMNS: &str =
    "id, name, price, category, category_name, dietary_tags, stock, is_popular";

#[async_trait::async_trait]
impl CatalogRepository for SqlCatalogRepository {
    async fn catalogue_snapshot(&self) -> Result<Vec<Dish>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {DISH_COLUMNS} FROM dish ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(dish_from_row).collect()
    }

    async fn find_dish(&self, id: &DishId) -> Result<Option<Dish>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {DISH_COLUMNS} FROM dish WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(dish_from_row).transpose()
    }
}

/// Normalize one catalogue row into the canonical `Dish` shape. The legacy
/// `category_name` column is coalesced with `category` here; nothing past
/// this boundary branches on which column was populated.
pub(crate) fn dish_from_row(row: &SqliteRow) -> Result<Dish, RepositoryError> {
    let id: String = row.try_get("id")?;

    let category: Option<String> = row.try_get("category")?;
    let legacy_category: Option<String> = row.try_get("category_name")?;
    let category_label = category
        .or(legacy_category)
        .ok_or_else(|| RepositoryError::Decode(format!("dish `{id}` has no category")))?;
    let category = DishCategory::from_str(&category_label)
        .map_err(|error| RepositoryError::Decode(format!("dish `{id}`: {error}")))?;

    let price_text: String = row.try_get("price")?;
    let price = Decimal::from_str(price_text.trim())
        .map_err(|error| RepositoryError::Decode(format!("dish `{id}` price: {error}")))?
        .round_dp(2);

    let tags_json: String = row.try_get("dietary_tags")?;
    let dietary_tags: BTreeSet<String> = serde_json::from_str::<Vec<String>>(&tags_json)
        .map_err(|error| RepositoryError::Decode(format!("dish `{id}` dietary_tags: {error}")))?
        .into_iter()
        .collect();

    let stock: i64 = row.try_get("stock")?;
    let stock = u32::try_from(stock)
        .map_err(|_| RepositoryError::Decode(format!("dish `{id}` has negative stock {stock}")))?;

    Ok(Dish {
        id: DishId(id),
        name: row.try_get("name")?,
        price,
        category,
        dietary_tags,
        stock,
        is_popular: row.try_get("is_popular")?,
    })
}
