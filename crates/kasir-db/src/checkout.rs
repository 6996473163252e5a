//! # Checkout Engine
//!
//! Turns a cart into a committed sale, or changes nothing.
//!
//! ## Transaction Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        checkout(cart)                                   │
//! │                                                                         │
//! │  validate_cart ── empty / oversized / qty <= 0 ──► InvalidInput         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN IMMEDIATE ─────────────────────────────────────────────┐         │
//! │  │  for each line, in cart order:                             │         │
//! │  │     ledger.price_and_stock_of   ─► ProductNotFound         │         │
//! │  │     draft.add_line (checked ×, +) ─► InvalidInput          │         │
//! │  │     ledger.decrement_stock      ─► InsufficientStock       │ any     │
//! │  │  insert_sale (header + all lines in one INSERT)            │ error:  │
//! │  │                                                            │ drop tx │
//! │  COMMIT ◄─────────────────────────────────────────────────────┘ = ROLLBACK
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Sale { id, total_amount, created_at, lines }                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `BEGIN IMMEDIATE` takes SQLite's write lock before the first read, so a
//! competing checkout waits (up to `busy_timeout`) and then sees committed
//! stock. The conditional decrement in the ledger is the final guard.
//!
//! Lines for the same product are processed one after another against the
//! already-decremented stock, and each produces its own sale line.
//!
//! Errors are returned as-is. Nothing here retries.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::KasirResult;
use crate::ledger::InventoryLedger;
use crate::repository::sale::insert_sale;
use kasir_core::validation::validate_cart;
use kasir_core::{CartLine, Sale, SaleDraft};

/// Converts carts into sales. Cheap to clone; shares the pool.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
}

impl CheckoutEngine {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutEngine { pool }
    }

    /// Checks out `lines` as one sale stamped with the current time.
    ///
    /// ## Errors
    /// - `InvalidInput` - empty cart, too many lines, non-positive quantity,
    ///   or a total that overflows
    /// - `ProductNotFound` - a line names a product that doesn't exist
    /// - `InsufficientStock` - a line asks for more than is left
    /// - `StorageFailure` - the database failed; nothing was written
    ///
    /// ## Example
    /// ```rust,ignore
    /// let sale = db.checkout().checkout(&[CartLine::new(1, 2)]).await?;
    /// assert!(sale.is_consistent());
    /// ```
    pub async fn checkout(&self, lines: &[CartLine]) -> KasirResult<Sale> {
        self.checkout_at(lines, Utc::now()).await
    }

    /// Same as [`checkout`](Self::checkout) with an explicit sale timestamp.
    pub async fn checkout_at(&self, lines: &[CartLine], created_at: DateTime<Utc>) -> KasirResult<Sale> {
        let result = self.run(lines, created_at).await;

        match &result {
            Ok(sale) => info!(
                sale_id = sale.id,
                total_amount = sale.total_amount,
                lines = sale.lines.len(),
                "Sale committed"
            ),
            Err(err) => warn!(
                kind = err.kind().code(),
                error = %err,
                "Checkout aborted"
            ),
        }

        result
    }

    async fn run(&self, lines: &[CartLine], created_at: DateTime<Utc>) -> KasirResult<Sale> {
        validate_cart(lines)?;

        debug!(lines = lines.len(), "Starting checkout");

        // Dropping `tx` without commit rolls back every write below.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let mut draft = SaleDraft::new();
        {
            let mut ledger = InventoryLedger::new(&mut *tx);
            for line in lines {
                let quote = ledger.price_and_stock_of(line.product_id).await?;
                draft.add_line(line, &quote)?;
                ledger.decrement_stock(line.product_id, line.quantity).await?;
            }
        }

        let sale = insert_sale(&mut *tx, &draft, created_at).await?;
        tx.commit().await?;

        Ok(sale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use kasir_core::{NewProduct, MAX_CART_LINES};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kopi = db.products().insert(&NewProduct::new("Kopi", 2500, 10)).await.unwrap();
        let roti = db.products().insert(&NewProduct::new("Roti", 3000, 5)).await.unwrap();
        (db, kopi.id, roti.id)
    }

    async fn stock_of(db: &Database, id: i64) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_checkout_persists_sale_and_decrements_stock() {
        let (db, kopi, roti) = setup().await;

        let sale = db
            .checkout()
            .checkout(&[CartLine::new(kopi, 2), CartLine::new(roti, 1)])
            .await
            .unwrap();

        assert_eq!(sale.total_amount, 8000);
        assert_eq!(sale.lines.len(), 2);
        assert_eq!(sale.lines[0].subtotal, 5000);
        assert_eq!(sale.lines[1].subtotal, 3000);
        assert!(sale.is_consistent());

        assert_eq!(stock_of(&db, kopi).await, 8);
        assert_eq!(stock_of(&db, roti).await, 4);

        let stored = db.sales().get_by_id(sale.id).await.unwrap().unwrap();
        assert_eq!(stored, sale);
    }

    #[tokio::test]
    async fn test_repeated_lines_sum_against_stock() {
        let (db, _, roti) = setup().await;

        let sale = db
            .checkout()
            .checkout(&[CartLine::new(roti, 3), CartLine::new(roti, 2)])
            .await
            .unwrap();
        assert_eq!(sale.lines.len(), 2);
        assert_eq!(stock_of(&db, roti).await, 0);

        db.products()
            .update(&kasir_core::Product {
                stock: 4,
                ..db.products().get_by_id(roti).await.unwrap().unwrap()
            })
            .await
            .unwrap();

        let err = db
            .checkout()
            .checkout(&[CartLine::new(roti, 3), CartLine::new(roti, 2)])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert_eq!(stock_of(&db, roti).await, 4);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let (db, kopi, roti) = setup().await;

        let err = db
            .checkout()
            .checkout(&[CartLine::new(kopi, 1), CartLine::new(roti, 6)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
        assert!(err.to_string().contains("Roti"));
        assert_eq!(stock_of(&db, kopi).await, 10);
        assert_eq!(stock_of(&db, roti).await, 5);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_rolls_back() {
        let (db, kopi, _) = setup().await;

        let err = db
            .checkout()
            .checkout(&[CartLine::new(kopi, 1), CartLine::new(9999, 1)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ProductNotFound);
        assert_eq!(stock_of(&db, kopi).await, 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_carts_are_rejected_before_any_write() {
        let (db, kopi, _) = setup().await;
        let engine = db.checkout();

        let err = engine.checkout(&[]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = engine.checkout(&[CartLine::new(kopi, 0)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = engine.checkout(&[CartLine::new(kopi, -2)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let oversized = vec![CartLine::new(kopi, 1); MAX_CART_LINES + 1];
        let err = engine.checkout(&oversized).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert_eq!(stock_of(&db, kopi).await, 10);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_overflowing_total_is_invalid_input() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pricey = db
            .products()
            .insert(&NewProduct::new("Emas", i64::MAX / 2, 10))
            .await
            .unwrap();

        let err = db
            .checkout()
            .checkout(&[CartLine::new(pricey.id, 3)])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(stock_of(&db, pricey.id).await, 10);
    }

    #[tokio::test]
    async fn test_sale_lines_keep_name_after_rename() {
        let (db, kopi, _) = setup().await;

        let sale = db.checkout().checkout(&[CartLine::new(kopi, 1)]).await.unwrap();

        let mut product = db.products().get_by_id(kopi).await.unwrap().unwrap();
        product.name = "Kopi Gula Aren".to_string();
        product.price = 9999;
        db.products().update(&product).await.unwrap();

        let lines = db.sales().lines_of(sale.id).await.unwrap();
        assert_eq!(lines[0].product_name, "Kopi");
        assert_eq!(lines[0].unit_price, 2500);
    }

    #[tokio::test]
    async fn test_checkout_at_uses_given_timestamp() {
        let (db, kopi, _) = setup().await;
        let at = Utc::now() - chrono::Duration::days(3);

        let sale = db.checkout().checkout_at(&[CartLine::new(kopi, 1)], at).await.unwrap();
        assert_eq!(sale.created_at, at);

        let stored = db.sales().get_by_id(sale.id).await.unwrap().unwrap();
        assert_eq!(stored.created_at, at);
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_failure() {
        let (db, kopi, _) = setup().await;
        db.close().await;

        let err = db.checkout().checkout(&[CartLine::new(kopi, 1)]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(!err.is_caller_error());

        let err = db.reports().daily_report().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
    }
}
