//! Storefront ranking API.
//!
//! Endpoints:
//! - `GET /api/v1/recommendations?userId=&limit=`: personalized feed, or the popular
//!   fallback feed when no `userId` is supplied
//! - `GET /api/v1/dishes/{dish_id}/similar?limit=&sameCategory=`: similar dishes for one dish
//! - `GET /api/v1/trending?limit=`: most-ordered dishes in the trailing window

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use savora_core::config::RecommendConfig;
use savora_core::{
    has_personalized_suggestions, ApplicationError, Dish, DishId, RecommendationEngine,
    RecommendationFeed, ShopperProfile, SimilarDish, SimilarityEngine, TrendingAggregator,
};
use savora_db::repositories::{
    CatalogRepository, FavoriteRepository, OrderHistoryRepository, PreferenceRepository,
    RepositoryError, SqlCatalogRepository, SqlFavoriteRepository, SqlOrderHistoryRepository,
    SqlPreferenceRepository,
};
use savora_db::DbPool;

#[derive(Clone)]
pub struct ApiState {
    pub db_pool: DbPool,
    pub recommend: RecommendConfig,
}

type ApiFailure = (StatusCode, Json<ApiError>);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimilarQuery {
    pub limit: Option<usize>,
    pub same_category: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TrendingQuery {
    pub limit: Option<usize>,
}

/// Both feed shapes share the outer payload; only the item type differs, so
/// the anonymous branch serializes plain dishes without ranking fields.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FeedResponse {
    Personalized(RecommendationFeed),
    #[serde(rename_all = "camelCase")]
    Anonymous { items: Vec<Dish>, has_personalized_suggestions: bool },
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub items: Vec<SimilarDish>,
}

#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub items: Vec<Dish>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/recommendations", get(recommendations))
        .route("/api/v1/dishes/{dish_id}/similar", get(similar_dishes))
        .route("/api/v1/trending", get(trending))
        .with_state(state)
}

async fn recommendations(
    State(state): State<ApiState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, ApiFailure> {
    let catalog = SqlCatalogRepository::new(state.db_pool.clone())
        .catalogue_snapshot()
        .await
        .map_err(|error| repository_failure("recommendations", error))?;
    let limit = Some(query.limit.unwrap_or(state.recommend.feed_limit));
    let engine = RecommendationEngine::new();

    let user_id = query.user_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let Some(user_id) = user_id else {
        let items = engine.popular_feed(&catalog, limit);
        return Ok(Json(FeedResponse::Anonymous { items, has_personalized_suggestions: false }));
    };

    let profile = load_profile(&state.db_pool, user_id)
        .await
        .map_err(|error| repository_failure("recommendations", error))?;

    let items = engine.personalized_feed(&catalog, &profile, limit);
    let personalized = has_personalized_suggestions(&items);
    info!(
        event_name = "api.recommendations.served",
        user_id = %user_id,
        item_count = items.len(),
        personalized,
        "personalized feed served"
    );

    Ok(Json(FeedResponse::Personalized(RecommendationFeed {
        items,
        has_personalized_suggestions: personalized,
    })))
}

async fn similar_dishes(
    State(state): State<ApiState>,
    Path(dish_id): Path<String>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<SimilarResponse>, ApiFailure> {
    let catalog_repo = SqlCatalogRepository::new(state.db_pool.clone());
    let target = catalog_repo
        .find_dish(&DishId(dish_id.clone()))
        .await
        .map_err(|error| repository_failure("similar", error))?
        .ok_or_else(|| not_found(format!("dish `{dish_id}` not found")))?;

    let catalog = catalog_repo
        .catalogue_snapshot()
        .await
        .map_err(|error| repository_failure("similar", error))?;

    let limit = Some(query.limit.unwrap_or(state.recommend.similar_limit));
    let items = SimilarityEngine::new().similar_dishes(
        &target,
        &catalog,
        limit,
        query.same_category.unwrap_or(false),
    );

    Ok(Json(SimilarResponse { items }))
}

async fn trending(
    State(state): State<ApiState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<TrendingResponse>, ApiFailure> {
    let now = Utc::now();
    let window_days = state.recommend.trending_window_days;
    let cutoff = now - Duration::days(window_days.max(1));

    let recent = SqlOrderHistoryRepository::new(state.db_pool.clone())
        .delivered_since(cutoff)
        .await
        .map_err(|error| repository_failure("trending", error))?;
    let catalog = SqlCatalogRepository::new(state.db_pool.clone())
        .catalogue_snapshot()
        .await
        .map_err(|error| repository_failure("trending", error))?;

    let limit = Some(query.limit.unwrap_or(state.recommend.trending_limit));
    let items = TrendingAggregator::new().trending_dishes(&recent, &catalog, now, window_days, limit);

    Ok(Json(TrendingResponse { items }))
}

async fn load_profile(pool: &DbPool, user_id: &str) -> Result<ShopperProfile, RepositoryError> {
    let orders = SqlOrderHistoryRepository::new(pool.clone());
    let favorites = SqlFavoriteRepository::new(pool.clone());
    let preferences = SqlPreferenceRepository::new(pool.clone());

    Ok(ShopperProfile {
        order_history: orders.history_for_user(user_id).await?,
        favorites: favorites.favorites_for_user(user_id).await?,
        dietary_preferences: preferences.preferences_for_user(user_id).await?,
    })
}

fn not_found(message: String) -> ApiFailure {
    let correlation_id = Uuid::new_v4().simple().to_string();
    (StatusCode::NOT_FOUND, Json(ApiError { error: message, correlation_id }))
}

fn repository_failure(operation: &str, error: RepositoryError) -> ApiFailure {
    let correlation_id = Uuid::new_v4().simple().to_string();
    error!(
        event_name = "api.repository_error",
        correlation_id = %correlation_id,
        operation,
        error = %error,
        "repository query failed"
    );

    let interface = ApplicationError::Persistence(error.to_string())
        .into_interface(correlation_id.clone());
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ApiError { error: interface.user_message().to_string(), correlation_id }),
    )
}
