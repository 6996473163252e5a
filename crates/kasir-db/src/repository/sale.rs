//! # Sale Repository
//!
//! Reads committed sales, and the two writes checkout performs inside its
//! transaction.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. PRICE + RESERVE (CheckoutEngine, InventoryLedger)                  │
//! │     └── SaleDraft accumulates lines and total                          │
//! │                                                                         │
//! │  2. PERSIST (this module, same transaction)                            │
//! │     └── insert_sale()   → one sales row, RETURNING id                  │
//! │     └── insert_lines()  → one multi-row INSERT for every line          │
//! │                                                                         │
//! │  3. COMMIT                                                             │
//! │     └── sale is immutable from here on; there is no update or void     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use kasir_core::{PendingSaleLine, Sale, SaleDraft, SaleLine};

const SALE_LINE_COLUMNS: &str =
    "id, sale_id, product_id, product_name, unit_price, quantity, subtotal";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID, with its lines.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        debug!(id, "Fetching sale");

        let sale: Option<Sale> =
            sqlx::query_as("SELECT id, total_amount, created_at FROM sales WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };

        sale.lines = select_lines(&self.pool, id).await?;
        Ok(Some(sale))
    }

    /// Gets the lines of a sale in insertion order.
    pub async fn lines_of(&self, sale_id: i64) -> DbResult<Vec<SaleLine>> {
        select_lines(&self.pool, sale_id).await
    }

    /// Counts committed sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction-scoped writes
// =============================================================================

/// Persists a priced draft as a sale and returns it fully populated.
///
/// Runs on the caller's transaction connection; nothing is visible to
/// other connections until that transaction commits.
pub(crate) async fn insert_sale(
    conn: &mut SqliteConnection,
    draft: &SaleDraft,
    created_at: DateTime<Utc>,
) -> DbResult<Sale> {
    let total_amount = draft.total().minor();

    let sale_id: i64 =
        sqlx::query_scalar("INSERT INTO sales (total_amount, created_at) VALUES (?1, ?2) RETURNING id")
            .bind(total_amount)
            .bind(created_at)
            .fetch_one(&mut *conn)
            .await?;

    debug!(sale_id, total_amount, lines = draft.len(), "Inserted sale header");

    let lines = insert_lines(conn, sale_id, draft.lines()).await?;

    Ok(Sale {
        id: sale_id,
        total_amount,
        created_at,
        lines,
    })
}

/// Inserts all lines of one sale with a single parameterized statement.
async fn insert_lines(
    conn: &mut SqliteConnection,
    sale_id: i64,
    lines: &[PendingSaleLine],
) -> DbResult<Vec<SaleLine>> {
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO sale_lines (sale_id, product_id, product_name, unit_price, quantity, subtotal) ",
    );
    builder.push_values(lines, |mut row, line| {
        row.push_bind(sale_id)
            .push_bind(line.product_id)
            .push_bind(line.product_name.clone())
            .push_bind(line.unit_price)
            .push_bind(line.quantity)
            .push_bind(line.subtotal);
    });
    builder.build().execute(&mut *conn).await?;

    // RETURNING order is unspecified for multi-row inserts
    select_lines(&mut *conn, sale_id).await
}

async fn select_lines<'e, E>(executor: E, sale_id: i64) -> DbResult<Vec<SaleLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {SALE_LINE_COLUMNS} FROM sale_lines WHERE sale_id = ?1 ORDER BY id");
    let lines = sqlx::query_as::<_, SaleLine>(&sql)
        .bind(sale_id)
        .fetch_all(executor)
        .await?;

    Ok(lines)
}
