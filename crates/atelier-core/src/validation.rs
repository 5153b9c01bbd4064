//! # Validation Module
//!
//! Input checks applied before anything touches the catalog or the ledger.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: HTTP extractors      JSON shape, enum spelling                │
//! │  Layer 2: THIS MODULE          barcodes, names, money, discount ranges  │
//! │  Layer 3: SQLite               NOT NULL, UNIQUE, CHECK(stock >= 0)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use atelier_core::validation::{validate_barcode, validate_quantity};
//!
//! assert!(validate_barcode("8901234567890").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::{Money, PERCENT_SCALE};
use crate::types::{DiscountInput, DiscountKind, ProductInput, SupplierInput};
use crate::{MAX_ITEM_QUANTITY, MAX_MONEY_CENTS};

pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a barcode.
///
/// ## Rules
/// - Not empty after trimming
/// - At most 64 characters
/// - No whitespace inside (scanners never emit it)
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 64,
        });
    }

    if barcode.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must not contain spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates a required display string such as a product or supplier name.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart or sale line quantity: 1 to [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if !(1..=MAX_ITEM_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Prices, costs and payments may be zero but never negative, and never
/// above [`MAX_MONEY_CENTS`].
pub fn validate_money(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    if amount.cents() > MAX_MONEY_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_MONEY_CENTS,
        });
    }

    Ok(())
}

pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

/// Validates a discount value against its kind.
///
/// ## Rules
/// - `Percentage`: 0 to 100 percent
/// - `Fixed`: a non-negative amount in minor units, up to [`MAX_MONEY_CENTS`]
///
/// ## Example
/// ```rust
/// use atelier_core::types::DiscountKind;
/// use atelier_core::validation::validate_discount_value;
///
/// assert!(validate_discount_value(DiscountKind::Percentage, 15).is_ok());
/// assert!(validate_discount_value(DiscountKind::Percentage, 101).is_err());
/// assert!(validate_discount_value(DiscountKind::Fixed, 50000).is_ok());
/// ```
pub fn validate_discount_value(kind: DiscountKind, value: i64) -> ValidationResult<()> {
    match kind {
        DiscountKind::Percentage if !(0..=PERCENT_SCALE).contains(&value) => {
            Err(ValidationError::OutOfRange {
                field: "value".to_string(),
                min: 0,
                max: PERCENT_SCALE,
            })
        }
        DiscountKind::Percentage => Ok(()),
        DiscountKind::Fixed => validate_money("value", Money::from_cents(value)),
    }
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a UUID string.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Receipt prefixes are short uppercase ASCII tags such as `ATL`.
pub fn validate_receipt_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.is_empty() || prefix.len() > 8 || !prefix.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "receipt_prefix".to_string(),
            reason: "must be 1 to 8 uppercase letters".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_product_input(input: &ProductInput) -> ValidationResult<()> {
    validate_barcode(&input.barcode)?;
    validate_required_text("name", &input.name, 200)?;
    validate_money("price", input.price)?;
    validate_money("cost", input.cost)?;
    validate_stock(input.stock)?;
    Ok(())
}

pub fn validate_supplier_input(input: &SupplierInput) -> ValidationResult<()> {
    validate_required_text("name", &input.name, 200)?;
    validate_required_text("phone", &input.phone, 32)?;
    Ok(())
}

pub fn validate_discount_input(input: &DiscountInput) -> ValidationResult<()> {
    validate_required_text("name", &input.name, 100)?;
    validate_discount_value(input.kind, input.value)?;

    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if end < start {
            return Err(ValidationError::InvalidFormat {
                field: "endDate".to_string(),
                reason: "must not be before startDate".to_string(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product_input() -> ProductInput {
        ProductInput {
            barcode: "8901234567890".to_string(),
            name: "Linen Shirt".to_string(),
            category: "Shirts".to_string(),
            size: Some("M".to_string()),
            color: Some("White".to_string()),
            description: None,
            price: Money::from_cents(349900),
            cost: Money::from_cents(180000),
            stock: 12,
            supplier_id: None,
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8901234567890").is_ok());
        assert!(validate_barcode("SKU-DRESS-01").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("   ").is_err());
        assert!(validate_barcode("89 01").is_err());
        assert!(validate_barcode(&"1".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-2).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_discount_value() {
        assert!(validate_discount_value(DiscountKind::Percentage, 0).is_ok());
        assert!(validate_discount_value(DiscountKind::Percentage, 10).is_ok());
        assert!(validate_discount_value(DiscountKind::Percentage, 100).is_ok());
        assert!(validate_discount_value(DiscountKind::Percentage, 101).is_err());
        assert!(validate_discount_value(DiscountKind::Percentage, 1000).is_err());
        assert!(validate_discount_value(DiscountKind::Percentage, -1).is_err());
        assert!(validate_discount_value(DiscountKind::Fixed, 0).is_ok());
        assert!(validate_discount_value(DiscountKind::Fixed, -100).is_err());
        assert!(validate_discount_value(DiscountKind::Fixed, MAX_MONEY_CENTS + 1).is_err());
    }

    #[test]
    fn test_validate_money_caps_amounts() {
        assert!(validate_money("price", Money::from_cents(MAX_MONEY_CENTS)).is_ok());
        assert_eq!(
            validate_money("price", Money::from_cents(i64::MAX / 2)),
            Err(ValidationError::OutOfRange {
                field: "price".to_string(),
                min: 0,
                max: MAX_MONEY_CENTS,
            })
        );

        let mut pricey = product_input();
        pricey.price = Money::from_cents(MAX_MONEY_CENTS + 1);
        assert!(validate_product_input(&pricey).is_err());
    }

    #[test]
    fn test_validate_product_input() {
        assert!(validate_product_input(&product_input()).is_ok());

        let mut negative = product_input();
        negative.stock = -1;
        assert_eq!(
            validate_product_input(&negative),
            Err(ValidationError::Negative {
                field: "stock".to_string()
            })
        );

        let mut unnamed = product_input();
        unnamed.name = " ".to_string();
        assert!(validate_product_input(&unnamed).is_err());
    }

    #[test]
    fn test_validate_supplier_requires_phone() {
        let input = SupplierInput {
            name: "Lahore Looms".to_string(),
            company: None,
            email: None,
            phone: String::new(),
            address: None,
        };
        assert_eq!(
            validate_supplier_input(&input),
            Err(ValidationError::Required {
                field: "phone".to_string()
            })
        );
    }

    #[test]
    fn test_validate_receipt_prefix() {
        assert!(validate_receipt_prefix("ATL").is_ok());
        assert!(validate_receipt_prefix("").is_err());
        assert!(validate_receipt_prefix("atl").is_err());
        assert!(validate_receipt_prefix("TOOLONGPFX").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
