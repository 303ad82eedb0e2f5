use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use larder_catalog::{Product, Stock};
use larder_core::{ProductRepository, RepositoryError, RepositoryResult, StockRepository};

/// Process-local backend for tests and local development.
///
/// All state sits behind one reader/writer lock: reads share it, writes hold
/// it exclusively for the whole operation, so an adjustment and its negative
/// check are observed atomically. Data is volatile across restarts.
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

struct MemoryState {
    products: HashMap<String, Product>,
    stocks: HashMap<String, Stock>,
    next_id: u32,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                products: HashMap::new(),
                stocks: HashMap::new(),
                next_id: 1,
            }),
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for MemoryRepository {
    async fn add_product(&self, product: &Product) -> RepositoryResult<String> {
        product.validate()?;

        let mut state = self.state.write().await;

        // Counter ids are never reused, even after a soft delete.
        let id = format!("PROD-{:03}", state.next_id);
        state.next_id += 1;

        let mut stored = product.clone();
        stored.id = id.clone();
        stored.is_active = true;

        state.products.insert(id.clone(), stored);
        state.stocks.insert(id.clone(), Stock::new(&id));

        debug!(product_id = %id, "added product");
        Ok(id)
    }

    async fn get_product(&self, id: &str) -> RepositoryResult<Product> {
        let state = self.state.read().await;
        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))
    }

    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }

    async fn search_products(&self, query: &str) -> RepositoryResult<Vec<Product>> {
        let query = query.to_lowercase();
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .filter(|p| {
                p.is_active
                    && (p.name.to_lowercase().contains(&query)
                        || p.brand.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    async fn update_product(&self, product: &Product) -> RepositoryResult<()> {
        product.validate()?;

        let mut state = self.state.write().await;
        if !state.products.contains_key(&product.id) {
            return Err(RepositoryError::NotFound(format!("product {}", product.id)));
        }
        state.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?;
        product.is_active = false;
        debug!(product_id = %id, "soft-deleted product");
        Ok(())
    }
}

#[async_trait]
impl StockRepository for MemoryRepository {
    async fn get_stock(&self, product_id: &str) -> RepositoryResult<Stock> {
        let state = self.state.read().await;
        state
            .stocks
            .get(product_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("stock for product {product_id}")))
    }

    async fn adjust_stock(
        &self,
        product_id: &str,
        boxes: i32,
        units: i32,
    ) -> RepositoryResult<Stock> {
        let mut state = self.state.write().await;
        let stock = state
            .stocks
            .get_mut(product_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("stock for product {product_id}")))?;

        let new_boxes = stock.quantity_boxes + boxes;
        let new_units = stock.quantity_units + units;
        if new_boxes < 0 || new_units < 0 {
            // Leave the record untouched; the caller learns what the
            // quantities would have been.
            return Err(RepositoryError::InsufficientStock {
                boxes: new_boxes,
                units: new_units,
            });
        }

        stock.quantity_boxes = new_boxes;
        stock.quantity_units = new_units;
        stock.last_updated = Utc::now();
        Ok(stock.clone())
    }

    async fn set_min_stock(&self, product_id: &str, min_stock: i32) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let stock = state
            .stocks
            .get_mut(product_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("stock for product {product_id}")))?;
        stock.min_stock = min_stock;
        Ok(())
    }

    async fn low_stock_products(&self) -> RepositoryResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut low = Vec::new();
        for (id, stock) in &state.stocks {
            let Some(product) = state.products.get(id) else {
                continue;
            };
            if product.is_active && stock.is_low(product.box_size) {
                low.push(product.clone());
            }
        }
        Ok(low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cola() -> Product {
        Product::new("Coca Cola 330ml Can", "Coca Cola", 330, "can", 24, 5.5, "drinks").unwrap()
    }

    #[tokio::test]
    async fn add_then_get_round_trips() {
        let repo = MemoryRepository::new();
        let product = cola();

        let id = repo.add_product(&product).await.unwrap();
        assert_eq!(id, "PROD-001");

        let got = repo.get_product(&id).await.unwrap();
        assert_eq!(got.id, id);
        assert!(got.is_active);
        // everything except the assigned id matches the input
        assert_eq!(got.name, product.name);
        assert_eq!(got.brand, product.brand);
        assert_eq!(got.size, product.size);
        assert_eq!(got.price, product.price);
    }

    #[tokio::test]
    async fn ids_are_sequential_and_never_reused() {
        let repo = MemoryRepository::new();
        let first = repo.add_product(&cola()).await.unwrap();
        repo.delete_product(&first).await.unwrap();

        let second = repo
            .add_product(&Product::new("Fanta 330ml Can", "Fanta", 330, "can", 24, 5.5, "drinks").unwrap())
            .await
            .unwrap();
        assert_eq!(first, "PROD-001");
        assert_eq!(second, "PROD-002");
    }

    #[tokio::test]
    async fn get_unknown_product_is_not_found() {
        let repo = MemoryRepository::new();
        let err = repo.get_product("PROD-999").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_rejects_invalid_product_without_storing() {
        let repo = MemoryRepository::new();
        let mut bad = cola();
        bad.name.clear();

        let err = repo.add_product(&bad).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert!(repo.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_returns_only_active_products() {
        let repo = MemoryRepository::new();
        let keep = repo.add_product(&cola()).await.unwrap();
        let gone = repo
            .add_product(&Product::new("Fanta 330ml Can", "Fanta", 330, "can", 24, 5.5, "drinks").unwrap())
            .await
            .unwrap();
        repo.delete_product(&gone).await.unwrap();

        let listed = repo.list_products().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, keep);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_over_name_and_brand() {
        let repo = MemoryRepository::new();
        repo.add_product(&cola()).await.unwrap();
        repo.add_product(
            &Product::new("Hummus 400g", "Yummy Foods", 400, "can", 12, 8.0, "canned").unwrap(),
        )
        .await
        .unwrap();

        let by_name = repo.search_products("cola").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Coca Cola 330ml Can");

        let by_brand = repo.search_products("YUMMY").await.unwrap();
        assert_eq!(by_brand.len(), 1);

        // no match is an empty list, not an error
        assert!(repo.search_products("no-such-product-xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_skips_inactive_products() {
        let repo = MemoryRepository::new();
        let id = repo.add_product(&cola()).await.unwrap();
        repo.delete_product(&id).await.unwrap();
        assert!(repo.search_products("cola").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_the_stored_record() {
        let repo = MemoryRepository::new();
        let id = repo.add_product(&cola()).await.unwrap();

        let mut updated = repo.get_product(&id).await.unwrap();
        updated.name = "Coca Cola Zero 330ml Can".to_string();
        updated.price = 6.0;
        repo.update_product(&updated).await.unwrap();

        let got = repo.get_product(&id).await.unwrap();
        assert_eq!(got.name, "Coca Cola Zero 330ml Can");
        assert_eq!(got.price, 6.0);
    }

    #[tokio::test]
    async fn update_unknown_product_is_not_found() {
        let repo = MemoryRepository::new();
        let mut ghost = cola();
        ghost.id = "PROD-404".to_string();
        let err = repo.update_product(&ghost).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_keeps_the_record() {
        let repo = MemoryRepository::new();
        let id = repo.add_product(&cola()).await.unwrap();

        repo.delete_product(&id).await.unwrap();
        repo.delete_product(&id).await.unwrap();

        let got = repo.get_product(&id).await.unwrap();
        assert!(!got.is_active);
        // its stock row survives too
        assert!(repo.get_stock(&id).await.is_ok());
    }

    #[tokio::test]
    async fn stock_walkthrough() {
        let repo = MemoryRepository::new();
        let id = repo.add_product(&cola()).await.unwrap();

        let stock = repo.get_stock(&id).await.unwrap();
        assert_eq!((stock.quantity_boxes, stock.quantity_units), (0, 0));

        let stock = repo.adjust_stock(&id, 5, 0).await.unwrap();
        assert_eq!(stock.total_units(24), 120);

        let err = repo.adjust_stock(&id, -10, 0).await.unwrap_err();
        assert_eq!(err, RepositoryError::InsufficientStock { boxes: -5, units: 0 });

        // failed adjustment changed nothing
        let stock = repo.get_stock(&id).await.unwrap();
        assert_eq!(stock.total_units(24), 120);

        repo.set_min_stock(&id, 200).await.unwrap();
        let low = repo.low_stock_products().await.unwrap();
        assert!(low.iter().any(|p| p.id == id));
    }

    #[tokio::test]
    async fn failed_adjust_applies_no_partial_change() {
        let repo = MemoryRepository::new();
        let id = repo.add_product(&cola()).await.unwrap();
        repo.adjust_stock(&id, 2, 5).await.unwrap();

        // the box delta alone would be fine; the unit delta makes it illegal
        let err = repo.adjust_stock(&id, 1, -6).await.unwrap_err();
        assert_eq!(err, RepositoryError::InsufficientStock { boxes: 3, units: -1 });

        let stock = repo.get_stock(&id).await.unwrap();
        assert_eq!((stock.quantity_boxes, stock.quantity_units), (2, 5));
    }

    #[tokio::test]
    async fn low_stock_ignores_inactive_products() {
        let repo = MemoryRepository::new();
        let id = repo.add_product(&cola()).await.unwrap();
        repo.set_min_stock(&id, 100).await.unwrap();
        assert_eq!(repo.low_stock_products().await.unwrap().len(), 1);

        repo.delete_product(&id).await.unwrap();
        assert!(repo.low_stock_products().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_deductions_never_oversell() {
        const CALLERS: usize = 8;

        let repo = Arc::new(MemoryRepository::new());
        let id = repo.add_product(&cola()).await.unwrap();
        repo.adjust_stock(&id, CALLERS as i32 - 1, 0).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let repo = Arc::clone(&repo);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                repo.adjust_stock(&id, -1, 0).await
            }));
        }

        let mut ok = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(RepositoryError::InsufficientStock { .. }) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(ok, CALLERS - 1);
        assert_eq!(insufficient, 1);
        let stock = repo.get_stock(&id).await.unwrap();
        assert_eq!(stock.quantity_boxes, 0);
    }
}
