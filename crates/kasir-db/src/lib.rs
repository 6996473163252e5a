//! # kasir-db: Storage and Transaction Core for Kasir
//!
//! SQLite storage, the Inventory Ledger, the Checkout Engine and Sales
//! Reporting, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasir Data Flow                                  │
//! │                                                                         │
//! │  Request shell ("create sale", "report")                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kasir-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ CheckoutEngine│───►│InventoryLedger│    │  Migrations  │  │   │
//! │  │   │ (checkout.rs) │    │  (ledger.rs)  │    │  (embedded)  │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │ insert_sale                                        │   │
//! │  │   ┌───────▼───────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Sales      │    │    Reports    │    │  Database    │  │   │
//! │  │   │  (sale.rs)    │    │  (report.rs)  │    │  (pool.rs)   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`ledger`] - Stock reads and guarded decrements inside a transaction
//! - [`checkout`] - Cart to sale, all or nothing
//! - [`repository`] - Product, sale and report repositories
//! - [`config`] - `kasir.toml` + environment configuration
//! - [`error`] - Storage errors and the caller-facing `KasirError`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kasir_core::CartLine;
//! use kasir_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./kasir.db")).await?;
//!
//! let sale = db.checkout().checkout(&[CartLine::new(1, 2)]).await?;
//! let report = db.reports().daily_report().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::CheckoutEngine;
pub use config::KasirConfig;
pub use error::{ConfigError, DbError, DbResult, ErrorKind, KasirError, KasirResult};
pub use ledger::InventoryLedger;
pub use logging::init_tracing;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
