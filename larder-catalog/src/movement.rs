use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CatalogError, CatalogResult};

/// Kinds of stock change a movement can record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Stock received
    In,
    /// Stock sold or used
    Out,
    /// Stock thrown away
    Waste,
    /// Inventory correction
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "IN",
            MovementType::Out => "OUT",
            MovementType::Waste => "WASTE",
            MovementType::Adjustment => "ADJUSTMENT",
        }
    }
}

impl FromStr for MovementType {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MovementType::In),
            "OUT" => Ok(MovementType::Out),
            "WASTE" => Ok(MovementType::Waste),
            "ADJUSTMENT" => Ok(MovementType::Adjustment),
            other => Err(CatalogError::UnknownMovementType(other.to_string())),
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit record of a single stock change.
///
/// Tracks who physically performed the action and who recorded it; when the
/// reporter is omitted the movement is self-reported. Persistence of these
/// records is owned by whoever consumes them, not by the repository layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockMovement {
    /// Backend-assigned on persistence; empty until then
    pub id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    pub boxes: i32,
    pub units: i32,
    /// Who physically did the action
    pub performed_by: String,
    /// Who logged it; defaults to the performer
    pub reported_by: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Build a validated movement. An empty `reported_by` defaults to
    /// `performed_by`.
    pub fn new(
        product_id: &str,
        movement_type: &str,
        boxes: i32,
        units: i32,
        performed_by: &str,
        reported_by: &str,
        reason: &str,
    ) -> CatalogResult<Self> {
        let movement_type: MovementType = movement_type.parse()?;
        let reported_by = if reported_by.is_empty() {
            performed_by
        } else {
            reported_by
        };

        let movement = StockMovement {
            id: String::new(),
            product_id: product_id.to_string(),
            movement_type,
            boxes,
            units,
            performed_by: performed_by.to_string(),
            reported_by: reported_by.to_string(),
            reason: reason.to_string(),
            created_at: Utc::now(),
        };
        movement.validate()?;
        Ok(movement)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.boxes == 0 && self.units == 0 {
            return Err(CatalogError::EmptyMovement);
        }
        if self.performed_by.is_empty() {
            return Err(CatalogError::MissingPerformer);
        }
        Ok(())
    }
}
