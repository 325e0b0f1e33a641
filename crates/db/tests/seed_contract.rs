//! End-to-end checks over the seeded storefront database: the seed dataset is
//! loaded through the fixture loader, read back through the SQL repositories,
//! and fed through the ranking engines with known expected output.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use savora_core::{
    has_personalized_suggestions, DishCategory, RecommendationEngine, ShopperProfile,
    SimilarityEngine, TrendingAggregator,
};
use savora_db::repositories::{
    CatalogRepository, FavoriteRepository, OrderHistoryRepository, PreferenceRepository,
    SqlCatalogRepository, SqlFavoriteRepository, SqlOrderHistoryRepository,
    SqlPreferenceRepository,
};
use savora_db::{connect_with_settings, migrations, DbPool, StorefrontSeedDataset};

const SEED_USER: &str = "shopper-casey";

async fn seeded_pool() -> DbPool {
    let pool =
        connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect to test database");
    migrations::run_pending(&pool).await.expect("run migrations");
    StorefrontSeedDataset::load(&pool).await.expect("load seed fixtures");
    pool
}

async fn seed_profile(pool: &DbPool) -> ShopperProfile {
    let orders = SqlOrderHistoryRepository::new(pool.clone());
    let favorites = SqlFavoriteRepository::new(pool.clone());
    let preferences = SqlPreferenceRepository::new(pool.clone());

    ShopperProfile {
        order_history: orders.history_for_user(SEED_USER).await.expect("order history"),
        favorites: favorites.favorites_for_user(SEED_USER).await.expect("favorites"),
        dietary_preferences: preferences.preferences_for_user(SEED_USER).await.expect("prefs"),
    }
}

#[tokio::test]
async fn seeded_catalogue_reads_back_normalized() {
    let pool = seeded_pool().await;
    let catalog =
        SqlCatalogRepository::new(pool.clone()).catalogue_snapshot().await.expect("snapshot");

    assert_eq!(catalog.len(), 8);
    assert_eq!(catalog.first().expect("first dish").id.0, "dish-margherita");

    let legacy = catalog.iter().find(|dish| dish.id.0 == "dish-seasonal-soup").expect("legacy row");
    assert_eq!(legacy.category, DishCategory::Appetizer);
    assert_eq!(legacy.price, Decimal::new(590, 2));

    let sold_out = catalog.iter().find(|dish| dish.id.0 == "dish-falafel-wrap").expect("sold out");
    assert!(!sold_out.in_stock());
}

#[tokio::test]
async fn personalized_feed_for_seed_shopper_ranks_preference_matches_first() {
    let pool = seeded_pool().await;
    let catalog =
        SqlCatalogRepository::new(pool.clone()).catalogue_snapshot().await.expect("snapshot");
    let profile = seed_profile(&pool).await;

    let feed = RecommendationEngine::new().personalized_feed(&catalog, &profile, None);

    let ids: Vec<&str> = feed.iter().map(|item| item.dish.id.0.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "dish-truffle-gnocchi",
            "dish-mango-lassi",
            "dish-bbq-ribs",
            "dish-garden-salad",
            "dish-seasonal-soup",
        ]
    );

    // Gnocchi: full vegetarian match (+50), favorite-category main (+20),
    // within 5.00 of the 10.20 mean paid price (+5).
    assert_eq!(feed[0].score, 75);
    assert_eq!(
        feed[0].reasons,
        vec!["Matches your preferences".to_string(), "Same category as your favorites".to_string()]
    );

    // Lassi: full match (+50) minus one prior unit (-2).
    assert_eq!(feed[1].score, 48);

    // Ribs: favorite category (+20), popular (+10), three prior units (-6).
    assert_eq!(feed[2].score, 24);

    assert!(has_personalized_suggestions(&feed));
    // Favorited dishes never resurface in the feed.
    assert!(!ids.contains(&"dish-margherita"));
    assert!(!ids.contains(&"dish-tiramisu"));
}

#[tokio::test]
async fn anonymous_feed_returns_popular_in_stock_dishes_in_catalogue_order() {
    let pool = seeded_pool().await;
    let catalog =
        SqlCatalogRepository::new(pool.clone()).catalogue_snapshot().await.expect("snapshot");

    let feed = RecommendationEngine::new().popular_feed(&catalog, None);
    let ids: Vec<&str> = feed.iter().map(|dish| dish.id.0.as_str()).collect();
    assert_eq!(ids, vec!["dish-margherita", "dish-bbq-ribs", "dish-tiramisu"]);
}

#[tokio::test]
async fn similar_dishes_for_seed_margherita() {
    let pool = seeded_pool().await;
    let catalog =
        SqlCatalogRepository::new(pool.clone()).catalogue_snapshot().await.expect("snapshot");
    let target = SqlCatalogRepository::new(pool.clone())
        .find_dish(&savora_core::DishId("dish-margherita".to_string()))
        .await
        .expect("lookup")
        .expect("margherita seeded");

    let similar = SimilarityEngine::new().similar_dishes(&target, &catalog, None, false);

    let ids: Vec<&str> = similar.iter().map(|item| item.dish.id.0.as_str()).collect();
    assert_eq!(ids.len(), 4);
    // Gnocchi and tiramisu both share the vegetarian tag and sit within the
    // wide price band; gnocchi wins the tie on catalogue order.
    assert_eq!(&ids[..3], &["dish-truffle-gnocchi", "dish-tiramisu", "dish-mango-lassi"]);
    assert_eq!(similar[0].similarity_score, 7.0);
    assert_eq!(similar[1].similarity_score, 7.0);
    assert_eq!(similar[2].similarity_score, 3.5);
}

#[tokio::test]
async fn trending_over_seed_window_counts_delivered_units_only() {
    let pool = seeded_pool().await;
    let catalog =
        SqlCatalogRepository::new(pool.clone()).catalogue_snapshot().await.expect("snapshot");
    let now = Utc::now();

    let cutoff = now - Duration::days(7);
    let recent =
        SqlOrderHistoryRepository::new(pool.clone()).delivered_since(cutoff).await.expect("window");
    assert_eq!(recent.len(), 4);

    let trending = TrendingAggregator::new().trending_dishes(&recent, &catalog, now, 7, None);
    let ids: Vec<&str> = trending.iter().map(|dish| dish.id.0.as_str()).collect();

    // Margherita: 3 delivered units across two shoppers. Salad: 2. Tiramisu: 1.
    // The cancelled lassi line and the 12-day-old rib order never count.
    assert_eq!(ids, vec!["dish-margherita", "dish-garden-salad", "dish-tiramisu"]);
}
