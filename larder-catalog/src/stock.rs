use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CatalogError, CatalogResult};

/// Quantity record for exactly one product, co-created with it.
///
/// Quantities are kept in two dimensions: whole boxes and loose units.
/// Both are non-negative at all times; backends enforce that on every
/// adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stock {
    pub product_id: String,
    pub quantity_boxes: i32,
    pub quantity_units: i32,
    /// Alert threshold in total units
    pub min_stock: i32,
    pub last_updated: DateTime<Utc>,
}

impl Stock {
    /// Zeroed stock for a freshly created product.
    pub fn new(product_id: &str) -> Self {
        Stock {
            product_id: product_id.to_string(),
            quantity_boxes: 0,
            quantity_units: 0,
            min_stock: 0,
            last_updated: Utc::now(),
        }
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.product_id.is_empty() {
            return Err(CatalogError::MissingProductId);
        }
        if self.quantity_boxes < 0 || self.quantity_units < 0 {
            return Err(CatalogError::NegativeQuantity {
                boxes: self.quantity_boxes,
                units: self.quantity_units,
            });
        }
        Ok(())
    }

    /// Total units on hand: boxes broken down by the product's box size
    /// plus the loose units.
    pub fn total_units(&self, box_size: i32) -> i32 {
        self.quantity_boxes * box_size + self.quantity_units
    }

    pub fn is_low(&self, box_size: i32) -> bool {
        self.total_units(box_size) < self.min_stock
    }
}
