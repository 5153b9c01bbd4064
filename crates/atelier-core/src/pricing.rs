//! # Pricing
//!
//! The arithmetic shared by the cart and the sale ledger. Both sides call the
//! same functions so a total shown at the till is the total that gets written.
//!
//! ```text
//! lines ──► subtotal = Σ qty × price
//!                │
//!                ▼
//!        discount_amount(kind, value)     percentage: subtotal × value / 100,
//!                │                                    round half up
//!                │                        fixed: min(value, subtotal)
//!                ▼
//!        total = max(0, subtotal − discount)
//!                │
//!                ▼
//!        change_due(method, total, paid)  cash only
//! ```
//!
//! [`Totals::compute`] saturates on overflow and is fine for display.
//! Anything that gets recorded goes through [`line_total`] and
//! [`Totals::checked`], which fail with `AmountTooLarge` instead.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountKind, PaymentMethod};

/// Amount a discount takes off `subtotal`.
///
/// A percentage `value` is whole percent (`10` is 10%); a fixed `value` is
/// minor units.
///
/// ## Example
/// ```rust
/// use atelier_core::money::Money;
/// use atelier_core::pricing::discount_amount;
/// use atelier_core::types::DiscountKind;
///
/// let subtotal = Money::from_cents(1000);
/// assert_eq!(discount_amount(subtotal, DiscountKind::Percentage, 10).cents(), 100);
/// assert_eq!(discount_amount(subtotal, DiscountKind::Fixed, 2500).cents(), 1000);
/// ```
pub fn discount_amount(subtotal: Money, kind: DiscountKind, value: i64) -> Money {
    if !subtotal.is_positive() || value <= 0 {
        return Money::zero();
    }

    let amount = match kind {
        DiscountKind::Percentage => subtotal.percentage(value),
        DiscountKind::Fixed => Money::from_cents(value),
    };

    amount.min(subtotal)
}

/// Price times quantity for a recorded line.
pub fn line_total(price: Money, quantity: i64) -> CoreResult<Money> {
    price.checked_mul(quantity).ok_or(CoreError::AmountTooLarge)
}

/// Change handed back for a payment.
///
/// Cash must cover the total; card and mobile are charged the exact total
/// so no change is ever due.
pub fn change_due(method: PaymentMethod, total: Money, paid: Money) -> CoreResult<Money> {
    if !method.gives_change() {
        return Ok(Money::zero());
    }

    if paid < total {
        return Err(CoreError::InsufficientPayment { total, paid });
    }

    Ok(paid - total)
}

/// Subtotal, discount and total for one cart or sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

impl Totals {
    /// Builds totals from line amounts and an optional `(kind, value)` discount.
    pub fn compute<I>(line_totals: I, discount: Option<(DiscountKind, i64)>) -> Self
    where
        I: IntoIterator<Item = Money>,
    {
        let subtotal: Money = line_totals.into_iter().sum();
        Self::from_subtotal(subtotal, discount)
    }

    /// Like [`compute`](Self::compute), but an overflowing subtotal is an
    /// error rather than a saturated value.
    pub fn checked<I>(line_totals: I, discount: Option<(DiscountKind, i64)>) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        let subtotal = line_totals
            .into_iter()
            .try_fold(Money::zero(), Money::checked_add)
            .ok_or(CoreError::AmountTooLarge)?;
        Ok(Self::from_subtotal(subtotal, discount))
    }

    fn from_subtotal(subtotal: Money, discount: Option<(DiscountKind, i64)>) -> Self {
        let discount = discount
            .map(|(kind, value)| discount_amount(subtotal, kind, value))
            .unwrap_or_default();

        Totals {
            subtotal,
            discount,
            total: subtotal.saturating_sub(discount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_percent_scenario() {
        // two lines: 2 × 250 and 1 × 500
        let totals = Totals::compute(
            [Money::from_cents(500), Money::from_cents(500)],
            Some((DiscountKind::Percentage, 10)),
        );
        assert_eq!(totals.subtotal.cents(), 1000);
        assert_eq!(totals.discount.cents(), 100);
        assert_eq!(totals.total.cents(), 900);

        let change = change_due(PaymentMethod::Cash, totals.total, Money::from_cents(1000)).unwrap();
        assert_eq!(change.cents(), 100);
    }

    #[test]
    fn test_discount_value_is_whole_percent() {
        // subtotal × value / 100
        assert_eq!(
            discount_amount(Money::from_cents(1000), DiscountKind::Percentage, 10).cents(),
            100
        );
        assert_eq!(
            discount_amount(Money::from_cents(2999), DiscountKind::Percentage, 25).cents(),
            750
        );
    }

    #[test]
    fn test_checked_totals_reject_overflow() {
        let huge = Money::from_cents(i64::MAX / 2);
        assert_eq!(line_total(huge, 3), Err(CoreError::AmountTooLarge));
        assert_eq!(line_total(Money::from_cents(250), 4).unwrap().cents(), 1000);

        assert_eq!(
            Totals::checked([huge, huge, huge], None),
            Err(CoreError::AmountTooLarge)
        );
        let totals = Totals::checked([Money::from_cents(500), Money::from_cents(500)], None).unwrap();
        assert_eq!(totals, Totals::compute([Money::from_cents(500), Money::from_cents(500)], None));
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let totals = Totals::compute([Money::from_cents(300)], Some((DiscountKind::Fixed, 500)));
        assert_eq!(totals.discount.cents(), 300);
        assert_eq!(totals.total, Money::zero());
    }

    #[test]
    fn test_no_discount() {
        let totals = Totals::compute([Money::from_cents(1299)], None);
        assert_eq!(totals.discount, Money::zero());
        assert_eq!(totals.total.cents(), 1299);
    }

    #[test]
    fn test_percentage_rounding_half_up() {
        // 15% of 3.33 = 0.4995 → 0.50
        assert_eq!(
            discount_amount(Money::from_cents(333), DiscountKind::Percentage, 15).cents(),
            50
        );
        // 100% never exceeds the subtotal
        assert_eq!(
            discount_amount(Money::from_cents(333), DiscountKind::Percentage, 100).cents(),
            333
        );
    }

    #[test]
    fn test_empty_subtotal_has_no_discount() {
        assert_eq!(
            discount_amount(Money::zero(), DiscountKind::Fixed, 500),
            Money::zero()
        );
    }

    #[test]
    fn test_change_rules() {
        let total = Money::from_cents(900);
        assert_eq!(
            change_due(PaymentMethod::Cash, total, Money::from_cents(900)).unwrap(),
            Money::zero()
        );
        assert_eq!(
            change_due(PaymentMethod::Cash, total, Money::from_cents(500)),
            Err(CoreError::InsufficientPayment {
                total,
                paid: Money::from_cents(500)
            })
        );
        assert_eq!(
            change_due(PaymentMethod::Card, total, Money::from_cents(2000)).unwrap(),
            Money::zero()
        );
        assert_eq!(
            change_due(PaymentMethod::Mobile, total, Money::zero()).unwrap(),
            Money::zero()
        );
    }
}
