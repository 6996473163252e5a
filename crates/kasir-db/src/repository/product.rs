//! # Product Repository
//!
//! Catalog operations on the `products` table.
//!
//! Checkout never goes through this repository: stock changes made by a
//! sale happen inside the checkout transaction via
//! [`InventoryLedger`](crate::ledger::InventoryLedger). This is the plain
//! single-row CRUD the surrounding shell uses to manage the catalog.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult, KasirResult};
use kasir_core::{NewProduct, Product};

/// Columns in `Product` field order.
const PRODUCT_COLUMNS: &str = "id, name, price, stock, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product and returns it with its generated id.
    ///
    /// Name, price and stock are validated before the database is touched.
    pub async fn insert(&self, product: &NewProduct) -> KasirResult<Product> {
        product.validate()?;

        debug!(name = %product.name, price = product.price, stock = product.stock, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products (name, price, stock, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?4) RETURNING {PRODUCT_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Product>(&sql)
            .bind(product.name.trim())
            .bind(product.price)
            .bind(product.stock)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(inserted)
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        debug!(id, "Fetching product");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products ordered by name.
    pub async fn list(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id LIMIT ?1");
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Updates name, price and stock of an existing product.
    ///
    /// Past sale lines keep the name and price they were sold with.
    ///
    /// ## Errors
    /// - `InvalidInput` for a blank name or negative price/stock
    /// - `StorageFailure` (`NotFound`) when the id does not exist
    pub async fn update(&self, product: &Product) -> KasirResult<Product> {
        product.validate()?;

        debug!(id = product.id, "Updating product");

        let sql = format!(
            "UPDATE products SET name = ?2, price = ?3, stock = ?4, updated_at = ?5 \
             WHERE id = ?1 RETURNING {PRODUCT_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, Product>(&sql)
            .bind(product.id)
            .bind(product.name.trim())
            .bind(product.price)
            .bind(product.stock)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| DbError::not_found("Product", product.id))?;

        Ok(updated)
    }

    /// Deletes a product.
    ///
    /// Sale lines are snapshots without a foreign key, so history survives.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, KasirError};
    use crate::pool::{Database, DbConfig};

    async fn setup() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = setup().await;

        let inserted = repo.insert(&NewProduct::new("Kopi Susu", 1500, 10)).await.unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.created_at, inserted.updated_at);

        let fetched = repo.get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);

        assert!(repo.get_by_id(inserted.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_product() {
        let repo = setup().await;

        let err = repo.insert(&NewProduct::new("", 1500, 10)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = repo.insert(&NewProduct::new("Teh", 1000, -1)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let repo = setup().await;
        let mut product = repo.insert(&NewProduct::new("Teh Botol", 4000, 5)).await.unwrap();

        product.name = "Teh Botol Sosro".to_string();
        product.stock = 12;
        let updated = repo.update(&product).await.unwrap();
        assert_eq!(updated.name, "Teh Botol Sosro");
        assert_eq!(updated.stock, 12);
        assert!(updated.updated_at >= updated.created_at);

        repo.delete(product.id).await.unwrap();
        assert!(matches!(repo.delete(product.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(
            repo.update(&product).await,
            Err(KasirError::Storage(DbError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_product() {
        let repo = setup().await;
        let original = repo.insert(&NewProduct::new("Roti", 8000, 1)).await.unwrap();

        let mut blank = original.clone();
        blank.name = "   ".to_string();
        let err = repo.update(&blank).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut negative_stock = original.clone();
        negative_stock.stock = -5;
        let err = repo.update(&negative_stock).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut negative_price = original.clone();
        negative_price.price = -1;
        let err = repo.update(&negative_price).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        // nothing reached the table
        assert_eq!(repo.get_by_id(original.id).await.unwrap().unwrap(), original);
    }

    #[tokio::test]
    async fn test_negative_stock_hits_check_constraint() {
        let repo = setup().await;
        let product = repo.insert(&NewProduct::new("Roti", 8000, 1)).await.unwrap();

        // bypasses validation to reach the schema guard
        let err: DbError = sqlx::query("UPDATE products SET stock = -1 WHERE id = ?1")
            .bind(product.id)
            .execute(&repo.pool)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let repo = setup().await;
        repo.insert(&NewProduct::new("Roti", 8000, 1)).await.unwrap();
        repo.insert(&NewProduct::new("Air Mineral", 3000, 1)).await.unwrap();
        repo.insert(&NewProduct::new("Kopi", 1500, 1)).await.unwrap();

        let names: Vec<_> = repo.list(10).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Air Mineral", "Kopi", "Roti"]);
        assert_eq!(repo.list(2).await.unwrap().len(), 2);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
