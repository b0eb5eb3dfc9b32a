//! Price, discount and tax types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A discount or tax specification.
///
/// - negative: an absolute amount per unit, of that magnitude
/// - positive: a rate applied to the price
/// - zero: nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Levy(pub Decimal);

impl Levy {
    /// No discount or tax.
    pub const NONE: Self = Self(Decimal::ZERO);

    /// Amount this levy takes from one unit sold at `price`.
    #[must_use]
    pub fn amount_on(self, price: Decimal) -> Decimal {
        if self.0 < Decimal::ZERO {
            self.0.abs()
        } else {
            price * self.0
        }
    }
}

/// Unit price with its discount and tax, for one tracked account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceDiscountTax {
    /// Unit sale price.
    pub price: Decimal,
    /// Discount specification.
    pub discount: Levy,
    /// Tax specification.
    pub tax: Levy,
}

impl PriceDiscountTax {
    /// Discount taken from one unit.
    #[must_use]
    pub fn unit_discount(&self) -> Decimal {
        self.discount.amount_on(self.price)
    }

    /// Tax charged on one unit.
    #[must_use]
    pub fn unit_tax(&self) -> Decimal {
        self.tax.amount_on(self.price)
    }
}

/// Invoice-level discount/tax tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTier {
    /// Minimum invoice total the tier applies to.
    pub threshold: Decimal,
    /// Invoice discount specification.
    pub discount: Levy,
    /// Invoice tax specification.
    pub tax: Levy,
}

/// Discount and tax computed for a whole invoice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceAdjustment {
    /// Invoice discount amount.
    pub discount: Decimal,
    /// Invoice tax amount.
    pub tax: Decimal,
}
