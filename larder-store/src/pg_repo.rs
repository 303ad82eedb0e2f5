use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error};

use larder_catalog::{Product, Stock};
use larder_core::{ProductRepository, RepositoryError, RepositoryResult, StockRepository};

/// Durable backend over the `products` and `stocks` tables.
///
/// Assumes the schema from `migrations/` is in place; it never creates it.
/// Multi-statement operations run inside a transaction, and the adjust path
/// relies on the row lock taken by its `UPDATE` so two concurrent deductions
/// cannot both pass the negative check against stale data.
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Deterministic fallback id from the product's identity columns, so
/// repeated inserts of the same logical product stay idempotent.
fn fallback_id(product: &Product) -> String {
    format!(
        "{}-{}-{}",
        product.brand.replace(' ', "").to_uppercase(),
        product.size,
        product.container_type.to_uppercase()
    )
}

fn storage_error(context: String, err: sqlx::Error) -> RepositoryError {
    error!("{context}: {err}");
    RepositoryError::Storage(format!("{context}: {err}"))
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    brand: String,
    size: i32,
    container_type: String,
    box_size: i32,
    price: f64,
    category: String,
    is_active: bool,
}

impl ProductRow {
    fn into_product(self) -> RepositoryResult<Product> {
        let category = if self.category.is_empty() {
            None
        } else {
            Some(self.category.parse().map_err(|err| {
                RepositoryError::Storage(format!("product {} holds a bad category: {err}", self.id))
            })?)
        };
        Ok(Product {
            id: self.id,
            name: self.name,
            brand: self.brand,
            size: self.size,
            container_type: self.container_type,
            box_size: self.box_size,
            price: self.price,
            category,
            is_active: self.is_active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StockRow {
    product_id: String,
    quantity_boxes: i32,
    quantity_units: i32,
    min_stock: i32,
    last_updated: DateTime<Utc>,
}

impl StockRow {
    fn into_stock(self) -> Stock {
        Stock {
            product_id: self.product_id,
            quantity_boxes: self.quantity_boxes,
            quantity_units: self.quantity_units,
            min_stock: self.min_stock,
            last_updated: self.last_updated,
        }
    }
}

fn category_column(product: &Product) -> &'static str {
    product.category.map(|c| c.as_str()).unwrap_or("")
}

#[async_trait]
impl ProductRepository for PgRepository {
    async fn add_product(&self, product: &Product) -> RepositoryResult<String> {
        product.validate()?;

        let id = if product.id.is_empty() {
            fallback_id(product)
        } else {
            product.id.clone()
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(format!("add_product {id}: begin"), e))?;

        let inserted = sqlx::query(
            "INSERT INTO products (id, name, brand, size, container_type, box_size, price, category, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (brand, size, container_type) DO NOTHING",
        )
        .bind(&id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.size)
        .bind(&product.container_type)
        .bind(product.box_size)
        .bind(product.price)
        .bind(category_column(product))
        .bind(true)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error(format!("add_product {id}: insert product"), e))?
        .rows_affected();

        // Conflict no-op: hand back the id that actually owns this
        // brand/size/container combination instead of a dangling one.
        let id = if inserted == 0 {
            sqlx::query_scalar::<_, String>(
                "SELECT id FROM products WHERE brand = $1 AND size = $2 AND container_type = $3",
            )
            .bind(&product.brand)
            .bind(product.size)
            .bind(&product.container_type)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| storage_error(format!("add_product {id}: resolve existing"), e))?
        } else {
            id
        };

        sqlx::query(
            "INSERT INTO stocks (product_id, quantity_boxes, quantity_units, min_stock, last_updated) \
             VALUES ($1, 0, 0, 0, CURRENT_TIMESTAMP) \
             ON CONFLICT (product_id) DO NOTHING",
        )
        .bind(&id)
        .execute(&mut *tx)
        .await
        .map_err(|e| storage_error(format!("add_product {id}: seed stock"), e))?;

        tx.commit()
            .await
            .map_err(|e| storage_error(format!("add_product {id}: commit"), e))?;

        debug!(product_id = %id, "added product");
        Ok(id)
    }

    async fn get_product(&self, id: &str) -> RepositoryResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, brand, size, container_type, box_size, price, category, is_active \
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(format!("get_product {id}"), e))?;

        row.ok_or_else(|| RepositoryError::NotFound(format!("product {id}")))?
            .into_product()
    }

    async fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, brand, size, container_type, box_size, price, category, is_active \
             FROM products WHERE is_active ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list_products".to_string(), e))?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn search_products(&self, query: &str) -> RepositoryResult<Vec<Product>> {
        let pattern = format!("%{query}%");
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, brand, size, container_type, box_size, price, category, is_active \
             FROM products WHERE is_active AND (name ILIKE $1 OR brand ILIKE $1) ORDER BY name",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error(format!("search_products {query:?}"), e))?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    async fn update_product(&self, product: &Product) -> RepositoryResult<()> {
        product.validate()?;

        let affected = sqlx::query(
            "UPDATE products SET name = $2, brand = $3, size = $4, container_type = $5, \
             box_size = $6, price = $7, category = $8, is_active = $9, \
             updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(product.size)
        .bind(&product.container_type)
        .bind(product.box_size)
        .bind(product.price)
        .bind(category_column(product))
        .bind(product.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(format!("update_product {}", product.id), e))?
        .rows_affected();

        if affected == 0 {
            return Err(RepositoryError::NotFound(format!("product {}", product.id)));
        }
        Ok(())
    }

    async fn delete_product(&self, id: &str) -> RepositoryResult<()> {
        let affected = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error(format!("delete_product {id}"), e))?
        .rows_affected();

        if affected == 0 {
            return Err(RepositoryError::NotFound(format!("product {id}")));
        }
        debug!(product_id = %id, "soft-deleted product");
        Ok(())
    }
}

#[async_trait]
impl StockRepository for PgRepository {
    async fn get_stock(&self, product_id: &str) -> RepositoryResult<Stock> {
        let row = sqlx::query_as::<_, StockRow>(
            "SELECT product_id, quantity_boxes, quantity_units, min_stock, last_updated \
             FROM stocks WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error(format!("get_stock {product_id}"), e))?;

        row.map(StockRow::into_stock)
            .ok_or_else(|| RepositoryError::NotFound(format!("stock for product {product_id}")))
    }

    async fn adjust_stock(
        &self,
        product_id: &str,
        boxes: i32,
        units: i32,
    ) -> RepositoryResult<Stock> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error(format!("adjust_stock {product_id}: begin"), e))?;

        // The UPDATE takes the row lock; the returned quantities are the
        // post-delta values no concurrent caller can sneak past.
        let row = sqlx::query_as::<_, StockRow>(
            "UPDATE stocks SET quantity_boxes = quantity_boxes + $2, \
             quantity_units = quantity_units + $3, last_updated = CURRENT_TIMESTAMP \
             WHERE product_id = $1 \
             RETURNING product_id, quantity_boxes, quantity_units, min_stock, last_updated",
        )
        .bind(product_id)
        .bind(boxes)
        .bind(units)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| storage_error(format!("adjust_stock {product_id}: apply delta"), e))?;

        let Some(row) = row else {
            return Err(RepositoryError::NotFound(format!(
                "stock for product {product_id}"
            )));
        };

        if row.quantity_boxes < 0 || row.quantity_units < 0 {
            tx.rollback()
                .await
                .map_err(|e| storage_error(format!("adjust_stock {product_id}: rollback"), e))?;
            return Err(RepositoryError::InsufficientStock {
                boxes: row.quantity_boxes,
                units: row.quantity_units,
            });
        }

        tx.commit()
            .await
            .map_err(|e| storage_error(format!("adjust_stock {product_id}: commit"), e))?;
        Ok(row.into_stock())
    }

    async fn set_min_stock(&self, product_id: &str, min_stock: i32) -> RepositoryResult<()> {
        let affected = sqlx::query("UPDATE stocks SET min_stock = $2 WHERE product_id = $1")
            .bind(product_id)
            .bind(min_stock)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(format!("set_min_stock {product_id}"), e))?
            .rows_affected();

        if affected == 0 {
            return Err(RepositoryError::NotFound(format!(
                "stock for product {product_id}"
            )));
        }
        Ok(())
    }

    async fn low_stock_products(&self) -> RepositoryResult<Vec<Product>> {
        // Total units are computed in the query so the threshold comparison
        // can never drift from the live quantities.
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT p.id, p.name, p.brand, p.size, p.container_type, p.box_size, p.price, \
             p.category, p.is_active \
             FROM products p JOIN stocks s ON p.id = s.product_id \
             WHERE p.is_active AND (s.quantity_boxes * p.box_size + s.quantity_units) < s.min_stock \
             ORDER BY p.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("low_stock_products".to_string(), e))?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }
}
