//! # Domain Types
//!
//! Core domain types used throughout Kasir.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  sale_id (FK)   │       │
//! │  │  name           │   │  total_amount   │   │  product_name   │       │
//! │  │  price          │   │  created_at     │   │  quantity       │       │
//! │  │  stock          │   │  lines          │   │  subtotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartLine     │──►│   StockQuote    │──►│   SaleDraft     │       │
//! │  │  (input only)   │   │ (ledger read)   │   │ (pending lines) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sale lines copy the product name and unit price at sale time, so a later
//! rename or price change never alters historical records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{validate_price, validate_product_name, validate_quantity, validate_stock};

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog, as held by the Inventory Ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier assigned by storage.
    pub id: i64,

    /// Display name, snapshotted onto sale lines.
    pub name: String,

    /// Unit price in minor units.
    pub price: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated (catalog edit or checkout).
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }

    /// Checks if `quantity` units can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock >= quantity
    }

    /// Validates the editable fields before a catalog update.
    pub fn validate(&self) -> CoreResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

/// Fields required to create a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: i64, stock: i64) -> Self {
        NewProduct {
            name: name.into(),
            price,
            stock,
        }
    }

    /// Validates name, price and stock before insert.
    pub fn validate(&self) -> CoreResult<()> {
        validate_product_name(&self.name)?;
        validate_price(self.price)?;
        validate_stock(self.stock)?;
        Ok(())
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// One requested purchase: a product id and a positive quantity.
///
/// Decodes from the transport form `{ "productId": 1, "quantity": 2 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    #[serde(alias = "product_id")]
    pub product_id: i64,
    pub quantity: i64,
}

impl CartLine {
    pub const fn new(product_id: i64, quantity: i64) -> Self {
        CartLine {
            product_id,
            quantity,
        }
    }
}

// =============================================================================
// Stock Quote
// =============================================================================

/// Name, price and stock of a product as read inside a checkout transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct StockQuote {
    pub product_id: i64,
    pub name: String,
    pub unit_price: i64,
    pub stock: i64,
}

// =============================================================================
// Sale Draft
// =============================================================================

/// A priced line waiting for its sale id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSaleLine {
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: i64,
    pub quantity: i64,
    /// unit_price × quantity
    pub subtotal: i64,
}

/// Accumulates priced lines for one checkout.
///
/// The running total is updated in the same step that appends a line, so
/// `total() == Σ lines().subtotal` holds for every reachable state. That is
/// the only place the sale total is ever computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleDraft {
    lines: Vec<PendingSaleLine>,
    total: Money,
}

impl SaleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prices `line` with `quote` and appends it.
    ///
    /// ## Errors
    /// - `Validation(MustBePositive)` - quantity is zero or negative
    /// - `Validation(Overflow)` - subtotal or running total leaves `i64`
    pub fn add_line(&mut self, line: &CartLine, quote: &StockQuote) -> CoreResult<&PendingSaleLine> {
        debug_assert_eq!(line.product_id, quote.product_id);
        validate_quantity(line.quantity)?;

        let subtotal = Money::from_minor(quote.unit_price)
            .checked_mul_quantity(line.quantity)
            .ok_or_else(|| ValidationError::Overflow {
                field: "subtotal".to_string(),
            })?;
        let total = self
            .total
            .checked_add(subtotal)
            .ok_or_else(|| ValidationError::Overflow {
                field: "total_amount".to_string(),
            })?;

        self.total = total;
        self.lines.push(PendingSaleLine {
            product_id: quote.product_id,
            product_name: quote.name.clone(),
            unit_price: quote.unit_price,
            quantity: line.quantity,
            subtotal: subtotal.minor(),
        });

        Ok(&self.lines[self.lines.len() - 1])
    }

    #[inline]
    pub fn total(&self) -> Money {
        self.total
    }

    #[inline]
    pub fn lines(&self) -> &[PendingSaleLine] {
        &self.lines
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted, immutable sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<SaleLine>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount)
    }

    /// Sum of all line quantities.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// True when the stored total matches the sum of line subtotals.
    pub fn is_consistent(&self) -> bool {
        self.lines.iter().map(SaleLine::subtotal).sum::<Money>() == self.total()
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Unit price at time of sale (frozen).
    pub unit_price: i64,
    pub quantity: i64,
    /// unit_price × quantity
    pub subtotal: i64,
}

impl SaleLine {
    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn quote(product_id: i64, unit_price: i64) -> StockQuote {
        StockQuote {
            product_id,
            name: format!("Product {}", product_id),
            unit_price,
            stock: 100,
        }
    }

    #[test]
    fn test_draft_total_tracks_lines() {
        let mut draft = SaleDraft::new();
        draft.add_line(&CartLine::new(1, 2), &quote(1, 2500)).unwrap();
        draft.add_line(&CartLine::new(2, 1), &quote(2, 3000)).unwrap();
        draft.add_line(&CartLine::new(1, 1), &quote(1, 2500)).unwrap();

        assert_eq!(draft.len(), 3);
        assert_eq!(draft.total().minor(), 10500);
        let sum: i64 = draft.lines().iter().map(|l| l.subtotal).sum();
        assert_eq!(sum, draft.total().minor());
    }

    #[test]
    fn test_draft_snapshots_name_and_price() {
        let mut draft = SaleDraft::new();
        let line = draft.add_line(&CartLine::new(9, 4), &quote(9, 125)).unwrap();

        assert_eq!(line.product_name, "Product 9");
        assert_eq!(line.unit_price, 125);
        assert_eq!(line.subtotal, 500);
    }

    #[test]
    fn test_draft_rejects_non_positive_quantity() {
        let mut draft = SaleDraft::new();
        let err = draft.add_line(&CartLine::new(1, 0), &quote(1, 100)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::MustBePositive { .. })));
        assert!(draft.is_empty());
        assert!(draft.total().is_zero());
    }

    #[test]
    fn test_draft_rejects_overflow_without_mutating() {
        let mut draft = SaleDraft::new();
        draft.add_line(&CartLine::new(1, 1), &quote(1, 10)).unwrap();

        let err = draft
            .add_line(&CartLine::new(2, 2), &quote(2, i64::MAX))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::Overflow { .. })));
        assert_eq!(draft.len(), 1);
        assert_eq!(draft.total().minor(), 10);
    }

    #[test]
    fn test_cart_line_decodes_transport_form() {
        let line: CartLine = serde_json::from_str(r#"{"productId": 3, "quantity": 2}"#).unwrap();
        assert_eq!(line, CartLine::new(3, 2));

        let line: CartLine = serde_json::from_str(r#"{"product_id": 4, "quantity": 1}"#).unwrap();
        assert_eq!(line, CartLine::new(4, 1));
    }

    #[test]
    fn test_product_can_sell() {
        let now = Utc::now();
        let product = Product {
            id: 1,
            name: "Kopi".to_string(),
            price: 1500,
            stock: 3,
            created_at: now,
            updated_at: now,
        };
        assert!(product.can_sell(3));
        assert!(!product.can_sell(4));
        assert!(!product.can_sell(0));
        assert_eq!(product.price().minor(), 1500);
    }

    #[test]
    fn test_sale_consistency() {
        let line = |id, subtotal| SaleLine {
            id,
            sale_id: 1,
            product_id: id,
            product_name: "x".to_string(),
            unit_price: subtotal,
            quantity: 1,
            subtotal,
        };
        let mut sale = Sale {
            id: 1,
            total_amount: 8000,
            created_at: Utc::now(),
            lines: vec![line(1, 5000), line(2, 3000)],
        };
        assert!(sale.is_consistent());
        assert_eq!(sale.item_count(), 2);

        sale.total_amount = 7999;
        assert!(!sale.is_consistent());
    }

    #[test]
    fn test_new_product_validation() {
        assert!(NewProduct::new("Kopi", 1500, 10).validate().is_ok());
        assert!(NewProduct::new("", 1500, 10).validate().is_err());
        assert!(NewProduct::new("Kopi", -1, 10).validate().is_err());
        assert!(NewProduct::new("Kopi", 1500, -10).validate().is_err());
    }
}
