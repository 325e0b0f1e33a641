use crate::connection::DbPool;
use crate::repositories::RepositoryError;
use sqlx::Executor;

/// Canonical seed contract for the storefront demo catalogue.
const SEED_DISHES: &[SeedDishContract] = &[
    SeedDishContract {
        dish_id: "dish-margherita",
        category: "main",
        stock: 24,
        is_popular: true,
        description: "Popular vegetarian main",
    },
    SeedDishContract {
        dish_id: "dish-truffle-gnocchi",
        category: "main",
        stock: 12,
        is_popular: false,
        description: "Premium vegetarian main",
    },
    SeedDishContract {
        dish_id: "dish-garden-salad",
        category: "side",
        stock: 30,
        is_popular: false,
        description: "Vegan gluten-free side",
    },
    SeedDishContract {
        dish_id: "dish-bbq-ribs",
        category: "main",
        stock: 8,
        is_popular: true,
        description: "Untagged popular main",
    },
    SeedDishContract {
        dish_id: "dish-tiramisu",
        category: "dessert",
        stock: 15,
        is_popular: true,
        description: "Popular dessert, favorited by the seed shopper",
    },
    SeedDishContract {
        dish_id: "dish-mango-lassi",
        category: "beverage",
        stock: 40,
        is_popular: false,
        description: "Low-price beverage",
    },
    SeedDishContract {
        dish_id: "dish-falafel-wrap",
        category: "main",
        stock: 0,
        is_popular: true,
        description: "Popular but sold out",
    },
    SeedDishContract {
        dish_id: "dish-seasonal-soup",
        category: "appetizer",
        stock: 18,
        is_popular: false,
        description: "Legacy-import row (category_name column only)",
    },
];

const SEED_USER_ID: &str = "shopper-casey";
const SEED_LINE_IDS: &[i64] = &[9001, 9002, 9003, 9004, 9005, 9006];
const SEED_USER_IDS: &[&str] = &["shopper-casey", "shopper-riley"];

/// Deterministic seed dataset for local development and end-to-end checks.
///
/// Covers the full catalogue surface the ranking engines care about: every
/// dish category, a sold-out dish, a legacy-import row, delivered orders
/// inside and outside the trending window, favorites, and dietary
/// preferences.
pub struct StorefrontSeedDataset;

impl StorefrontSeedDataset {
    /// SQL fixture content for the storefront seed dataset.
    pub const SQL: &str = include_str!("../../../config/fixtures/storefront_seed_data.sql");

    /// Load the seed dataset into the database. Reloads are idempotent.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let dishes_seeded = SEED_DISHES
            .iter()
            .map(|dish| DishSeedInfo {
                dish_id: dish.dish_id,
                category: dish.category,
                description: dish.description,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { seed_user_id: SEED_USER_ID, dishes_seeded })
    }

    /// Verify that seed data exists and matches the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for dish in SEED_DISHES {
            let dish_ok: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM dish WHERE id = ?1
                    AND COALESCE(category, category_name) = ?2
                    AND stock = ?3 AND is_popular = ?4)",
            )
            .bind(dish.dish_id)
            .bind(dish.category)
            .bind(dish.stock)
            .bind(dish.is_popular)
            .fetch_one(pool)
            .await?;
            checks.push((dish.dish_id, dish_ok == 1));
        }

        let line_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM order_line_item WHERE id IN {}",
            sql_array_from_line_ids(SEED_LINE_IDS)
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("order-lines", line_count == SEED_LINE_IDS.len() as i64));

        let delivered_in_window: i64 = sqlx::query_scalar(
            "SELECT COUNT(1) FROM order_line_item
             WHERE status = 'delivered'
               AND completed_at >= strftime('%Y-%m-%dT%H:%M:%S+00:00', 'now', '-7 days')",
        )
        .fetch_one(pool)
        .await?;
        checks.push(("delivered-in-window", delivered_in_window == 4));

        let favorite_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM favorite WHERE user_id = ?1")
                .bind(SEED_USER_ID)
                .fetch_one(pool)
                .await?;
        checks.push(("favorites", favorite_count == 2));

        let preference_ok: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM dietary_preference WHERE user_id = ?1 AND tag = 'vegetarian')",
        )
        .bind(SEED_USER_ID)
        .fetch_one(pool)
        .await?;
        checks.push(("dietary-preferences", preference_ok == 1));

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }

    /// Clean up seeded fixtures from a test database.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        let quoted_lines = sql_array_from_line_ids(SEED_LINE_IDS);
        let quoted_users = sql_array_from_ids(SEED_USER_IDS);
        let quoted_dishes = sql_array_from_ids(
            &SEED_DISHES.iter().map(|dish| dish.dish_id).collect::<Vec<_>>(),
        );

        sqlx::query(&format!("DELETE FROM order_line_item WHERE id IN {quoted_lines}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM favorite WHERE user_id IN {quoted_users}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM dietary_preference WHERE user_id IN {quoted_users}"))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("DELETE FROM dish WHERE id IN {quoted_dishes}"))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedDishContract {
    dish_id: &'static str,
    category: &'static str,
    stock: i64,
    is_popular: bool,
    description: &'static str,
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id)).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

fn sql_array_from_line_ids(ids: &[i64]) -> String {
    let joined = ids.iter().map(i64::to_string).collect::<Vec<_>>().join(",");
    format!("({joined})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub seed_user_id: &'static str,
    pub dishes_seeded: Vec<DishSeedInfo>,
}

#[derive(Debug)]
pub struct DishSeedInfo {
    pub dish_id: &'static str,
    pub category: &'static str,
    pub description: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
