use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DishId(pub String);

/// Fixed menu taxonomy. New categories require a migration, not a new string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishCategory {
    Appetizer,
    Main,
    Side,
    Dessert,
    Beverage,
    Special,
}

impl DishCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DishCategory::Appetizer => "appetizer",
            DishCategory::Main => "main",
            DishCategory::Side => "side",
            DishCategory::Dessert => "dessert",
            DishCategory::Beverage => "beverage",
            DishCategory::Special => "special",
        }
    }
}

impl FromStr for DishCategory {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "appetizer" => Ok(Self::Appetizer),
            "main" => Ok(Self::Main),
            "side" => Ok(Self::Side),
            "dessert" => Ok(Self::Dessert),
            "beverage" => Ok(Self::Beverage),
            "special" => Ok(Self::Special),
            other => Err(DomainError::UnknownCategory(other.to_owned())),
        }
    }
}

/// A sellable catalogue item. Immutable within a single ranking pass; the
/// catalogue store owns mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: DishId,
    pub name: String,
    pub price: Decimal,
    pub category: DishCategory,
    pub dietary_tags: BTreeSet<String>,
    pub stock: u32,
    pub is_popular: bool,
}

impl Dish {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;

    use super::{Dish, DishCategory, DishId};

    #[test]
    fn category_labels_round_trip() {
        for category in [
            DishCategory::Appetizer,
            DishCategory::Main,
            DishCategory::Side,
            DishCategory::Dessert,
            DishCategory::Beverage,
            DishCategory::Special,
        ] {
            assert_eq!(category.as_str().parse::<DishCategory>().expect("round trip"), category);
        }
    }

    #[test]
    fn category_parse_is_case_insensitive_and_trimmed() {
        assert_eq!(" Main ".parse::<DishCategory>().expect("parse"), DishCategory::Main);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("street-food".parse::<DishCategory>().is_err());
    }

    #[test]
    fn dish_serializes_with_storefront_field_names() {
        let dish = Dish {
            id: DishId("dish-pad-thai".to_string()),
            name: "Pad Thai".to_string(),
            price: Decimal::new(1250, 2),
            category: DishCategory::Main,
            dietary_tags: BTreeSet::from(["gluten-free".to_string()]),
            stock: 12,
            is_popular: true,
        };

        let value = serde_json::to_value(&dish).expect("serialize");
        assert_eq!(value["dietaryTags"][0], "gluten-free");
        assert_eq!(value["isPopular"], true);
        assert_eq!(value["category"], "main");
    }
}
