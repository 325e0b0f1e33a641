use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::run_pending;
    use crate::connect_with_settings;

    const MANAGED_SCHEMA_OBJECTS: &[&str] = &[
        "dish",
        "order_line_item",
        "favorite",
        "dietary_preference",
        "idx_dish_category",
        "idx_order_line_item_user_id",
        "idx_order_line_item_dish_id",
        "idx_order_line_item_completed_at",
        "idx_favorite_user_id",
        "idx_dietary_preference_user_id",
    ];

    #[tokio::test]
    async fn migrations_create_every_managed_schema_object() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("run migrations");

        for object in MANAGED_SCHEMA_OBJECTS {
            let count = sqlx::query(
                "SELECT COUNT(*) AS count FROM sqlite_master WHERE name = ?",
            )
            .bind(object)
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|_| panic!("check schema object {object}"))
            .get::<i64, _>("count");

            assert_eq!(count, 1, "expected managed schema object `{object}`");
        }

        pool.close().await;
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("first run");
        run_pending(&pool).await.expect("second run");
        pool.close().await;
    }
}
