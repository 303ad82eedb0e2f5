use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CatalogError, CatalogResult};

/// Product categories recognized by the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Drinks,
    Vegetables,
    Dairy,
    Meat,
    DryGoods,
    Sauces,
    Canned,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Drinks => "drinks",
            Category::Vegetables => "vegetables",
            Category::Dairy => "dairy",
            Category::Meat => "meat",
            Category::DryGoods => "dry_goods",
            Category::Sauces => "sauces",
            Category::Canned => "canned",
        }
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drinks" => Ok(Category::Drinks),
            "vegetables" => Ok(Category::Vegetables),
            "dairy" => Ok(Category::Dairy),
            "meat" => Ok(Category::Meat),
            "dry_goods" => Ok(Category::DryGoods),
            "sauces" => Ok(Category::Sauces),
            "canned" => Ok(Category::Canned),
            other => Err(CatalogError::UnknownCategory(other.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A catalog entry. One product owns exactly one stock record, keyed by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Backend-assigned identifier, stable once set
    pub id: String,
    pub name: String,
    pub brand: String,
    /// Size in ml or grams
    pub size: i32,
    /// Free-form tag: "can", "bottle", "bag", "kg"
    pub container_type: String,
    /// Units per box; 0 means sold individually
    pub box_size: i32,
    /// Price per unit
    pub price: f64,
    /// None means uncategorized
    pub category: Option<Category>,
    pub is_active: bool,
}

impl Product {
    /// Build a validated product. The id is left empty for the backend to
    /// assign; an empty category string means uncategorized.
    pub fn new(
        name: &str,
        brand: &str,
        size: i32,
        container_type: &str,
        box_size: i32,
        price: f64,
        category: &str,
    ) -> CatalogResult<Self> {
        let category = if category.is_empty() {
            None
        } else {
            Some(category.parse()?)
        };

        let product = Product {
            id: String::new(),
            name: name.to_string(),
            brand: brand.to_string(),
            size,
            container_type: container_type.to_string(),
            box_size,
            price,
            category,
            is_active: true,
        };
        product.validate()?;
        Ok(product)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.name.is_empty() {
            return Err(CatalogError::NameRequired);
        }
        if self.size <= 0 {
            return Err(CatalogError::InvalidSize(self.size));
        }
        if self.price < 0.0 {
            return Err(CatalogError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_is_active_with_empty_id() {
        let p = Product::new("Coca Cola 330ml Can", "Coca Cola", 330, "can", 24, 5.5, "drinks")
            .unwrap();
        assert!(p.id.is_empty());
        assert!(p.is_active);
        assert_eq!(p.category, Some(Category::Drinks));
    }

    #[test]
    fn name_is_required() {
        let err = Product::new("", "Coca Cola", 330, "can", 24, 5.5, "drinks").unwrap_err();
        assert_eq!(err, CatalogError::NameRequired);
    }

    #[test]
    fn size_must_be_positive() {
        let err = Product::new("Cola", "Coca Cola", 0, "can", 24, 5.5, "drinks").unwrap_err();
        assert_eq!(err, CatalogError::InvalidSize(0));

        let err = Product::new("Cola", "Coca Cola", -330, "can", 24, 5.5, "drinks").unwrap_err();
        assert_eq!(err, CatalogError::InvalidSize(-330));
    }

    #[test]
    fn price_cannot_be_negative() {
        let err = Product::new("Cola", "Coca Cola", 330, "can", 24, -0.5, "drinks").unwrap_err();
        assert_eq!(err, CatalogError::InvalidPrice(-0.5));

        // zero is a legal price
        assert!(Product::new("Tap Water", "", 500, "bottle", 0, 0.0, "drinks").is_ok());
    }

    #[test]
    fn category_must_be_recognized_or_empty() {
        let err = Product::new("Cola", "Coca Cola", 330, "can", 24, 5.5, "snacks").unwrap_err();
        assert_eq!(err, CatalogError::UnknownCategory("snacks".to_string()));

        let p = Product::new("Red Pepper", "Fresh Farms", 1000, "kg", 0, 15.0, "").unwrap();
        assert_eq!(p.category, None);
    }

    #[test]
    fn category_slugs_round_trip() {
        for slug in ["drinks", "vegetables", "dairy", "meat", "dry_goods", "sauces", "canned"] {
            let cat: Category = slug.parse().unwrap();
            assert_eq!(cat.as_str(), slug);
        }
    }
}
