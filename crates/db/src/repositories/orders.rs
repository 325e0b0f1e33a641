use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use savora_core::domain::dish::DishId;
use savora_core::domain::order::{OrderLineItem, OrderStatus};

use super::{OrderHistoryRepository, RepositoryError};
use crate::DbPool;

pub struct SqlOrderHistoryRepository {
    pool: DbPool,
}

impl SqlOrderHistoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const LINE_COLUMNS: &str = "dish_id, quantity, unit_price, status, completed_at";

#[async_trait::async_trait]
impl OrderHistoryRepository for SqlOrderHistoryRepository {
    async fn history_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<OrderLineItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM order_line_item WHERE user_id = ? ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }

    async fn delivered_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<OrderLineItem>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM order_line_item
             WHERE status = 'delivered' AND completed_at >= ?
             ORDER BY id"
        ))
        .bind(cutoff.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(line_from_row).collect()
    }
}

fn line_from_row(row: &SqliteRow) -> Result<OrderLineItem, RepositoryError> {
    let dish_id: String = row.try_get("dish_id")?;

    let quantity: i64 = row.try_get("quantity")?;
    let quantity = u32::try_from(quantity).map_err(|_| {
        RepositoryError::Decode(format!("line for `{dish_id}` has invalid quantity {quantity}"))
    })?;

    let price_text: String = row.try_get("unit_price")?;
    let unit_price = Decimal::from_str(price_text.trim())
        .map_err(|error| {
            RepositoryError::Decode(format!("line for `{dish_id}` unit_price: {error}"))
        })?
        .round_dp(2);

    let status_label: String = row.try_get("status")?;
    let status = OrderStatus::from_str(&status_label)
        .map_err(|error| RepositoryError::Decode(format!("line for `{dish_id}`: {error}")))?;

    let completed_text: String = row.try_get("completed_at")?;
    let completed_at = DateTime::parse_from_rfc3339(completed_text.trim())
        .map_err(|error| {
            RepositoryError::Decode(format!("line for `{dish_id}` completed_at: {error}"))
        })?
        .with_timezone(&Utc);

    Ok(OrderLineItem { dish_id: DishId(dish_id), quantity, unit_price, completed_at, status })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    use savora_core::domain::order::OrderStatus;

    use super::super::OrderHistoryRepository;
    use super::SqlOrderHistoryRepository;
    use crate::{connect_with_settings, migrations};

    async fn insert_line(
        pool: &crate::DbPool,
        user_id: &str,
        dish_id: &str,
        quantity: u32,
        status: &str,
        days_ago: i64,
    ) {
        sqlx::query(
            "INSERT INTO order_line_item (order_id, user_id, dish_id, quantity, unit_price, status, completed_at)
             VALUES ('order-1', ?, ?, ?, '11.90', ?, ?)",
        )
        .bind(user_id)
        .bind(dish_id)
        .bind(quantity)
        .bind(status)
        .bind((Utc::now() - Duration::days(days_ago)).to_rfc3339())
        .execute(pool)
        .await
        .expect("insert line");
    }

    #[tokio::test]
    async fn history_is_scoped_to_the_user_and_decodes_prices() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        insert_line(&pool, "user-maya", "dish-a", 2, "delivered", 1).await;
        insert_line(&pool, "user-sam", "dish-b", 1, "delivered", 1).await;

        let repository = SqlOrderHistoryRepository::new(pool.clone());
        let history = repository.history_for_user("user-maya").await.expect("history");

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].dish_id.0, "dish-a");
        assert_eq!(history[0].unit_price, Decimal::new(1190, 2));
        assert_eq!(history[0].status, OrderStatus::Delivered);

        pool.close().await;
    }

    #[tokio::test]
    async fn delivered_since_excludes_old_and_non_delivered_lines() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        insert_line(&pool, "user-maya", "dish-fresh", 1, "delivered", 2).await;
        insert_line(&pool, "user-maya", "dish-stale", 1, "delivered", 30).await;
        insert_line(&pool, "user-maya", "dish-cancelled", 1, "cancelled", 2).await;

        let repository = SqlOrderHistoryRepository::new(pool.clone());
        let window =
            repository.delivered_since(Utc::now() - Duration::days(7)).await.expect("window");

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].dish_id.0, "dish-fresh");

        pool.close().await;
    }
}
