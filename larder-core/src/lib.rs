pub mod repository;

pub use repository::{ProductRepository, Repository, StockRepository};

/// Failure kinds any storage backend can report.
///
/// Backends wrap lower-level storage failures into `Storage` with the
/// operation and identifier involved; raw driver errors never cross this
/// boundary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("validation failed: {0}")]
    Validation(#[from] larder_catalog::CatalogError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("insufficient stock: would result in {boxes} boxes, {units} units")]
    InsufficientStock { boxes: i32, units: i32 },

    #[error("storage error: {0}")]
    Storage(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
