//! # Inventory Ledger
//!
//! Authoritative stock counts and prices, read and decremented inside the
//! caller's checkout transaction.
//!
//! ## Reserve-and-Price
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE (write lock held from here)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_and_stock_of(id)  ──► StockQuote { name, unit_price, stock }     │
//! │       │                      (missing row → ProductNotFound)            │
//! │       ▼                                                                 │
//! │  decrement_stock(id, q)                                                 │
//! │     UPDATE products SET stock = stock - q                               │
//! │      WHERE id = ? AND stock >= q                                        │
//! │       │                                                                 │
//! │       ├── 1 row  ──► remaining stock                                    │
//! │       └── 0 rows ──► re-read: ProductNotFound | InsufficientStock       │
//! │                                                                         │
//! │  Stock can never go negative: the guard is in the statement itself,     │
//! │  backed by CHECK (stock >= 0) on the table.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::{DbError, KasirResult};
use kasir_core::validation::validate_quantity;
use kasir_core::{CoreError, StockQuote};

/// Ledger view over one open transaction.
///
/// Borrowing the connection mutably ties every ledger call to the
/// transaction that will commit or roll back the whole checkout.
#[derive(Debug)]
pub struct InventoryLedger<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> InventoryLedger<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        InventoryLedger { conn }
    }

    /// Reads the current name, price and stock of a product.
    ///
    /// ## Errors
    /// - `ProductNotFound` when no product has this id
    pub async fn price_and_stock_of(&mut self, product_id: i64) -> KasirResult<StockQuote> {
        let quote = self.find_quote(product_id).await?;
        quote.ok_or_else(|| CoreError::ProductNotFound(product_id).into())
    }

    /// Removes `quantity` units from stock and returns what is left.
    ///
    /// ## Errors
    /// - `Validation(MustBePositive)` for a zero or negative quantity
    /// - `ProductNotFound` when no product has this id
    /// - `InsufficientStock` when fewer than `quantity` units remain
    pub async fn decrement_stock(&mut self, product_id: i64, quantity: i64) -> KasirResult<i64> {
        validate_quantity(quantity)?;

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            RETURNING stock
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(DbError::from)?;

        if let Some(remaining) = remaining {
            debug!(product_id, quantity, remaining, "Stock decremented");
            return Ok(remaining);
        }

        // The write lock is still ours, so this read explains the miss.
        match self.find_quote(product_id).await? {
            None => Err(CoreError::ProductNotFound(product_id).into()),
            Some(quote) => Err(CoreError::InsufficientStock {
                product_id,
                name: quote.name,
                available: quote.stock,
                requested: quantity,
            }
            .into()),
        }
    }

    async fn find_quote(&mut self, product_id: i64) -> Result<Option<StockQuote>, DbError> {
        let quote = sqlx::query_as::<_, StockQuote>(
            "SELECT id AS product_id, name, price AS unit_price, stock FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(quote)
    }
}
