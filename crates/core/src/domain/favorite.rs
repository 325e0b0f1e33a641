use serde::{Deserialize, Serialize};

use crate::domain::dish::{DishCategory, DishId};

/// An explicit user favorite. Unique per (user, dish); the category is the
/// dish's category captured at the time of favoriting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub dish_id: DishId,
    pub category: DishCategory,
}
