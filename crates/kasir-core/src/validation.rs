//! # Validation Module
//!
//! Input validation utilities for Kasir.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request shell (outside this repo)                            │
//! │  └── Decoding, required parameters                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Cart shape (non-empty, bounded, positive quantities)              │
//! │  └── Catalog fields (name, price, stock)                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (price >= 0)                            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::validation::{validate_cart, validate_quantity};
//! use kasir_core::CartLine;
//!
//! assert!(validate_cart(&[CartLine::new(1, 2)]).is_ok());
//! assert!(validate_cart(&[]).is_err());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::CartLine;
use crate::MAX_CART_LINES;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum product name length in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

// =============================================================================
// Cart Validators
// =============================================================================

/// Validates the shape of a cart before a checkout transaction is opened.
///
/// ## Rules
/// - Must contain at least one line (empty carts are rejected, never turned
///   into zero-line sales)
/// - At most `MAX_CART_LINES` lines
/// - Every quantity positive
///
/// Repeated product ids are allowed.
pub fn validate_cart(lines: &[CartLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "cart items".to_string(),
        });
    }

    if lines.len() > MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 1,
            max: MAX_CART_LINES as i64,
        });
    }

    for line in lines {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

/// Validates a quantity value: must be positive (> 0).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_PRODUCT_NAME_LEN` characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed (free items).
///
/// ## Example
/// ```rust
/// use kasir_core::validation::validate_price;
///
/// assert!(validate_price(1099).is_ok());
/// assert!(validate_price(0).is_ok());
/// assert!(validate_price(-100).is_err());
/// ```
pub fn validate_price(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_cart() {
        assert!(validate_cart(&[CartLine::new(1, 1)]).is_ok());
        // repeated ids are fine
        assert!(validate_cart(&[CartLine::new(1, 1), CartLine::new(1, 4)]).is_ok());

        assert_eq!(
            validate_cart(&[]),
            Err(ValidationError::Required {
                field: "cart items".to_string()
            })
        );
        assert!(validate_cart(&[CartLine::new(1, 1), CartLine::new(2, 0)]).is_err());
        assert!(validate_cart(&[CartLine::new(1, -3)]).is_err());
    }

    #[test]
    fn test_validate_cart_size_limit() {
        let at_limit = vec![CartLine::new(1, 1); MAX_CART_LINES];
        assert!(validate_cart(&at_limit).is_ok());

        let over_limit = vec![CartLine::new(1, 1); MAX_CART_LINES + 1];
        assert!(matches!(
            validate_cart(&over_limit),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1_000_000).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Indomie Goreng").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_price_and_stock() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(-1).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }
}
