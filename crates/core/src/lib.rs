pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;
pub mod similar;
pub mod trending;

pub use domain::dish::{Dish, DishCategory, DishId};
pub use domain::favorite::Favorite;
pub use domain::order::{OrderLineItem, OrderStatus};
pub use domain::profile::ShopperProfile;
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use recommend::{
    has_personalized_suggestions, RankedDish, RecommendationEngine, RecommendationFeed,
};
pub use similar::{SimilarDish, SimilarityEngine};
pub use trending::{TrendingAggregator, TrendingWindow};
