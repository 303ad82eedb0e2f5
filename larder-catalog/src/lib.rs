pub mod movement;
pub mod product;
pub mod stock;

pub use movement::{MovementType, StockMovement};
pub use product::{Category, Product};
pub use stock::Stock;

/// Validation errors for catalog domain values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("product name is required")]
    NameRequired,

    #[error("product size must be positive, got {0}")]
    InvalidSize(i32),

    #[error("product price cannot be negative, got {0}")]
    InvalidPrice(f64),

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("product id is required for stock")]
    MissingProductId,

    #[error("stock cannot be negative: {boxes} boxes, {units} units")]
    NegativeQuantity { boxes: i32, units: i32 },

    #[error("unknown movement type: {0}")]
    UnknownMovementType(String),

    #[error("movement must change boxes or units")]
    EmptyMovement,

    #[error("movement performer is required")]
    MissingPerformer,
}

pub type CatalogResult<T> = Result<T, CatalogError>;
