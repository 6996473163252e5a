//! # Report Repository
//!
//! Revenue, transaction count and best seller over a half-open window of
//! sale timestamps.
//!
//! ## Query Plan
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (deferred, read-only snapshot)                                   │
//! │                                                                         │
//! │  1. sales WHERE start <= created_at < end                               │
//! │     └── COALESCE(SUM(total_amount), 0), COUNT(*)                        │
//! │                                                                         │
//! │  2. sale_lines ⋈ in-window sales, GROUP BY product_id                   │
//! │     └── ORDER BY SUM(quantity) DESC, product_id ASC LIMIT 1             │
//! │         name = snapshot on the product's latest in-window line          │
//! │                                                                         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both queries read the same WAL snapshot, so revenue and best seller can
//! never disagree about which sales are in the window. Readers don't take
//! the write lock and never delay a checkout.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult, KasirResult};
use kasir_core::{BestSeller, ReportWindow, SalesReport};

/// Repository for sales reporting.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Report over `[start, end)`.
    ///
    /// ## Errors
    /// - `InvalidRange` when `start >= end`
    pub async fn report(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> KasirResult<SalesReport> {
        let window = ReportWindow::new(start, end)?;
        Ok(self.report_window(&window).await?)
    }

    /// Report over today's local calendar day.
    pub async fn daily_report(&self) -> KasirResult<SalesReport> {
        Ok(self.report_window(&ReportWindow::today()).await?)
    }

    /// Report over whole local calendar days, `end_date` included.
    ///
    /// ## Errors
    /// - `InvalidRange` when `end_date` is before `start_date`
    pub async fn report_for_dates(&self, start_date: NaiveDate, end_date: NaiveDate) -> KasirResult<SalesReport> {
        let window = ReportWindow::from_dates(start_date, end_date)?;
        Ok(self.report_window(&window).await?)
    }

    /// Report over an already-validated window.
    pub async fn report_window(&self, window: &ReportWindow) -> DbResult<SalesReport> {
        debug!(start = %window.start(), end = %window.end(), "Computing sales report");

        let mut tx = self.pool.begin().await?;

        let (total_revenue, total_transactions): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM sales
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_one(&mut *tx)
        .await?;

        // With exactly one MAX() aggregate, SQLite takes the bare
        // product_name from the row holding that maximum.
        let best_selling_product: Option<BestSeller> = sqlx::query_as(
            r#"
            SELECT
                sl.product_id AS product_id,
                sl.product_name AS name,
                SUM(sl.quantity) AS quantity_sold,
                MAX(sl.id) AS latest_line_id
            FROM sale_lines sl
            INNER JOIN sales s ON s.id = sl.sale_id
            WHERE s.created_at >= ?1 AND s.created_at < ?2
            GROUP BY sl.product_id
            ORDER BY quantity_sold DESC, sl.product_id ASC
            LIMIT 1
            "#,
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::from)?;

        debug!(
            total_revenue,
            total_transactions,
            best_seller = ?best_selling_product.as_ref().map(|b| b.product_id),
            "Sales report computed"
        );

        Ok(SalesReport {
            window: *window,
            total_revenue,
            total_transactions,
            best_selling_product,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use kasir_core::{CartLine, NewProduct};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, h, m, 0).unwrap()
    }

    fn feb_first() -> ReportWindow {
        ReportWindow::new(at(0, 0), at(0, 0) + Duration::hours(24)).unwrap()
    }

    async fn setup() -> (Database, i64, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = db.products().insert(&NewProduct::new("Kopi", 1000, 100)).await.unwrap();
        let b = db.products().insert(&NewProduct::new("Roti", 1000, 100)).await.unwrap();
        (db, a.id, b.id)
    }

    #[tokio::test]
    async fn test_empty_window() {
        let (db, _, _) = setup().await;

        let report = db.reports().report_window(&feb_first()).await.unwrap();
        assert_eq!(report, SalesReport::empty(feb_first()));
    }

    #[tokio::test]
    async fn test_revenue_and_count() {
        let (db, a, b) = setup().await;
        let engine = db.checkout();

        engine.checkout_at(&[CartLine::new(a, 5)], at(9, 0)).await.unwrap();
        engine.checkout_at(&[CartLine::new(b, 3)], at(15, 30)).await.unwrap();

        let report = db.reports().report_window(&feb_first()).await.unwrap();
        assert_eq!(report.total_revenue, 8000);
        assert_eq!(report.total_transactions, 2);
    }

    #[tokio::test]
    async fn test_best_seller_by_quantity() {
        let (db, a, b) = setup().await;
        let engine = db.checkout();

        engine.checkout_at(&[CartLine::new(a, 3)], at(9, 0)).await.unwrap();
        engine
            .checkout_at(&[CartLine::new(b, 4), CartLine::new(b, 3)], at(10, 0))
            .await
            .unwrap();

        let best = db
            .reports()
            .report_window(&feb_first())
            .await
            .unwrap()
            .best_selling_product
            .unwrap();
        assert_eq!(best.product_id, b);
        assert_eq!(best.name, "Roti");
        assert_eq!(best.quantity_sold, 7);
    }

    #[tokio::test]
    async fn test_best_seller_tie_goes_to_lowest_id() {
        let (db, a, b) = setup().await;
        let engine = db.checkout();

        engine.checkout_at(&[CartLine::new(b, 2)], at(9, 0)).await.unwrap();
        engine.checkout_at(&[CartLine::new(a, 2)], at(10, 0)).await.unwrap();

        let best = db
            .reports()
            .report_window(&feb_first())
            .await
            .unwrap()
            .best_selling_product
            .unwrap();
        assert_eq!(best.product_id, a.min(b));
    }

    #[tokio::test]
    async fn test_best_seller_name_is_latest_snapshot() {
        let (db, a, _) = setup().await;
        let engine = db.checkout();

        engine.checkout_at(&[CartLine::new(a, 1)], at(9, 0)).await.unwrap();

        let mut product = db.products().get_by_id(a).await.unwrap().unwrap();
        product.name = "Kopi Tubruk".to_string();
        db.products().update(&product).await.unwrap();

        engine.checkout_at(&[CartLine::new(a, 1)], at(11, 0)).await.unwrap();

        let best = db
            .reports()
            .report_window(&feb_first())
            .await
            .unwrap()
            .best_selling_product
            .unwrap();
        assert_eq!(best.name, "Kopi Tubruk");
        assert_eq!(best.quantity_sold, 2);
    }

    #[tokio::test]
    async fn test_window_is_half_open() {
        let (db, a, _) = setup().await;
        let engine = db.checkout();
        let window = feb_first();

        engine.checkout_at(&[CartLine::new(a, 1)], window.start()).await.unwrap();
        engine.checkout_at(&[CartLine::new(a, 1)], window.end()).await.unwrap();
        engine
            .checkout_at(&[CartLine::new(a, 1)], window.start() - Duration::seconds(1))
            .await
            .unwrap();

        let report = db.reports().report_window(&window).await.unwrap();
        assert_eq!(report.total_transactions, 1);
        assert_eq!(report.total_revenue, 1000);
        assert_eq!(report.best_selling_product.unwrap().quantity_sold, 1);
    }

    #[tokio::test]
    async fn test_sub_second_timestamps_stay_ordered() {
        let (db, a, _) = setup().await;
        let engine = db.checkout();
        let window = feb_first();

        let just_before_end = window.end() - Duration::milliseconds(1);
        engine.checkout_at(&[CartLine::new(a, 1)], just_before_end).await.unwrap();
        engine
            .checkout_at(&[CartLine::new(a, 1)], window.end() + Duration::milliseconds(500))
            .await
            .unwrap();

        let report = db.reports().report_window(&window).await.unwrap();
        assert_eq!(report.total_transactions, 1);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let (db, _, _) = setup().await;

        let err = db.reports().report(at(12, 0), at(8, 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);

        let err = db.reports().report(at(8, 0), at(8, 0)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);

        let start = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let err = db.reports().report_for_dates(start, end).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[tokio::test]
    async fn test_daily_report_counts_todays_sales() {
        let (db, a, _) = setup().await;

        db.checkout().checkout(&[CartLine::new(a, 2)]).await.unwrap();
        db.checkout()
            .checkout_at(&[CartLine::new(a, 1)], Utc::now() - Duration::days(2))
            .await
            .unwrap();

        let report = db.reports().daily_report().await.unwrap();
        assert_eq!(report.window, ReportWindow::today());
        assert_eq!(report.total_transactions, 1);
        assert_eq!(report.total_revenue, 2000);
    }
}
