//! # kasir-core: Pure Business Logic for Kasir
//!
//! This crate holds the rules of the point-of-sale core as pure functions
//! with zero I/O dependencies. Everything that touches storage lives in
//! `kasir-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Kasir Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Request-handling shell (outside this repo)          │   │
//! │  │        "create sale" ──► checkout    "report" ──► report        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasir-db (storage + transactions)            │   │
//! │  │       InventoryLedger ◄── CheckoutEngine      ReportRepository  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kasir-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Window   │  │   cart    │  │   │
//! │  │   │ SaleDraft │  │ checked × │  │ BestSeller│  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, Sale, SaleLine, SaleDraft)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`report`] - Half-open report windows and report output types
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use kasir_core::{CartLine, SaleDraft, StockQuote};
//!
//! let quote = StockQuote {
//!     product_id: 7,
//!     name: "Kopi Susu".to_string(),
//!     unit_price: 1500,
//!     stock: 10,
//! };
//!
//! let mut draft = SaleDraft::new();
//! draft.add_line(&CartLine::new(7, 3), &quote).unwrap();
//!
//! assert_eq!(draft.total().minor(), 4500);
//! ```

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{BestSeller, ReportWindow, SalesReport};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// A cart longer than this is treated as malformed input rather than a
/// legitimate purchase, which also bounds the size of one checkout
/// transaction.
pub const MAX_CART_LINES: usize = 100;
