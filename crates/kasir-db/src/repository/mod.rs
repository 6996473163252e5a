//! # Repository Module
//!
//! Database repositories for Kasir.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Database (pool.rs)                                                     │
//! │   ├── products()  ──► ProductRepository   catalog CRUD                  │
//! │   ├── sales()     ──► SaleRepository      committed sales + lines       │
//! │   ├── reports()   ──► ReportRepository    windowed aggregates           │
//! │   └── checkout()  ──► CheckoutEngine      (checkout.rs, not a repo)     │
//! │                                                                         │
//! │  Each repository owns a clone of the pool and keeps its SQL to itself.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD
//! - [`SaleRepository`](sale::SaleRepository) - Sale and sale line reads
//! - [`ReportRepository`](report::ReportRepository) - Sales reporting

pub mod product;
pub mod report;
pub mod sale;
