use async_trait::async_trait;
use larder_catalog::{Product, Stock};

use crate::RepositoryResult;

/// Catalog-side operations any storage backend must provide
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Validate the product, assign an identifier, and seed a zeroed stock
    /// row alongside it. Returns the assigned identifier.
    async fn add_product(&self, product: &Product) -> RepositoryResult<String>;

    async fn get_product(&self, id: &str) -> RepositoryResult<Product>;

    /// All products with the active flag set; ordering is backend-defined.
    async fn list_products(&self) -> RepositoryResult<Vec<Product>>;

    /// Case-insensitive substring match over name and brand. No matches is
    /// an empty list, never an error.
    async fn search_products(&self, query: &str) -> RepositoryResult<Vec<Product>>;

    /// Wholesale replacement of the stored record.
    async fn update_product(&self, product: &Product) -> RepositoryResult<()>;

    /// Soft delete: clears the active flag; the record and its stock stay
    /// queryable by id. Deleting an already-inactive product succeeds.
    async fn delete_product(&self, id: &str) -> RepositoryResult<()>;
}

/// Stock-side operations any storage backend must provide
#[async_trait]
pub trait StockRepository: Send + Sync {
    async fn get_stock(&self, product_id: &str) -> RepositoryResult<Stock>;

    /// Apply signed deltas to boxes and units atomically. If either
    /// resulting quantity would be negative, nothing changes and
    /// `InsufficientStock` reports the would-be values. Returns the stock
    /// as it stands after the adjustment.
    async fn adjust_stock(
        &self,
        product_id: &str,
        boxes: i32,
        units: i32,
    ) -> RepositoryResult<Stock>;

    /// Idempotent overwrite of the alert threshold.
    async fn set_min_stock(&self, product_id: &str, min_stock: i32) -> RepositoryResult<()>;

    /// Active products whose live total units sit below their threshold.
    async fn low_stock_products(&self) -> RepositoryResult<Vec<Product>>;
}

/// The full storage contract; consumers wire against `Arc<dyn Repository>`.
pub trait Repository: ProductRepository + StockRepository {}

impl<T: ProductRepository + StockRepository> Repository for T {}
