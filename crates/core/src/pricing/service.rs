//! Invoice pricing: per-item expansion and tiered invoice adjustments.

use rust_decimal::Decimal;

use super::types::{InvoiceAdjustment, InvoiceTier, Levy, PriceDiscountTax};
use crate::chart::names;
use crate::posting::Line;

/// Pricing calculator for sales and services.
///
/// Stateless; price rows and tiers come from the chart of accounts.
pub struct PricingCalculator;

impl PricingCalculator {
    /// Amount a discount or tax spec takes from one unit at `price`.
    #[must_use]
    pub fn per_unit(price: Decimal, spec: Levy) -> Decimal {
        spec.amount_on(price)
    }

    /// Revenue, discount and tax lines for selling `quantity` units of `item`.
    ///
    /// The quantity sign is dropped; a sale always grows these accounts.
    /// Tax is emitted twice, as `tax of X` expense and as `tax` payable.
    #[must_use]
    pub fn expand_account(item: &str, row: &PriceDiscountTax, quantity: Decimal) -> Vec<Line> {
        let quantity = quantity.abs();
        let tax = row.unit_tax() * quantity;

        vec![
            Line::new(names::revenue_of(item), row.price * quantity, quantity),
            Line::new(names::discount_of(item), row.unit_discount() * quantity, quantity),
            Line::new(names::tax_of(item), tax, quantity),
            Line::new(names::TAX, tax, quantity),
        ]
    }

    /// Running invoice total before tax: revenue minus discount.
    #[must_use]
    pub fn invoice_total(lines: &[Line]) -> Decimal {
        lines
            .iter()
            .map(|line| {
                if names::revenue_item(&line.account).is_some() {
                    line.value
                } else if names::discount_item(&line.account).is_some() {
                    -line.value
                } else {
                    Decimal::ZERO
                }
            })
            .sum()
    }

    /// Last tier whose threshold does not exceed `total`.
    #[must_use]
    pub fn select_tier(tiers: &[InvoiceTier], total: Decimal) -> Option<&InvoiceTier> {
        tiers.iter().rev().find(|tier| tier.threshold <= total)
    }

    /// Invoice discount and tax for `total`, zero when no tier applies.
    #[must_use]
    pub fn invoice_adjustment(tiers: &[InvoiceTier], total: Decimal) -> InvoiceAdjustment {
        Self::select_tier(tiers, total).map_or_else(InvoiceAdjustment::default, |tier| {
            InvoiceAdjustment {
                discount: Self::per_unit(total, tier.discount),
                tax: Self::per_unit(total, tier.tax),
            }
        })
    }

    /// Lines carrying an invoice adjustment.
    ///
    /// The discount reduces the temporary `invoice discount` account; the tax
    /// is charged to `invoice tax` and owed on `tax`.
    #[must_use]
    pub fn invoice_lines(adjustment: InvoiceAdjustment) -> Vec<Line> {
        vec![
            Line::new(names::INVOICE_DISCOUNT, -adjustment.discount, Decimal::NEGATIVE_ONE),
            Line::new(names::INVOICE_TAX, adjustment.tax, Decimal::ONE),
            Line::new(names::TAX, adjustment.tax, Decimal::ONE),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn tiers() -> Vec<InvoiceTier> {
        vec![
            InvoiceTier {
                threshold: dec!(5),
                discount: Levy::NONE,
                tax: Levy::NONE,
            },
            InvoiceTier {
                threshold: dec!(100),
                discount: Levy(dec!(0.02)),
                tax: Levy(dec!(0.01)),
            },
        ]
    }

    #[rstest]
    #[case(dec!(-3), dec!(40), dec!(3))]
    #[case(dec!(0.5), dec!(40), dec!(20))]
    #[case(dec!(0), dec!(40), dec!(0))]
    fn test_per_unit(#[case] spec: Decimal, #[case] price: Decimal, #[case] expected: Decimal) {
        assert_eq!(PricingCalculator::per_unit(price, Levy(spec)), expected);
    }

    #[test]
    fn test_expand_account() {
        let row = PriceDiscountTax {
            price: dec!(20),
            discount: Levy(dec!(0.1)),
            tax: Levy(dec!(-1)),
        };
        let lines = PricingCalculator::expand_account("book", &row, dec!(-3));

        assert_eq!(
            lines,
            vec![
                Line::new("revenue of book", dec!(60), dec!(3)),
                Line::new("discount of book", dec!(6), dec!(3)),
                Line::new("tax of book", dec!(3), dec!(3)),
                Line::new("tax", dec!(3), dec!(3)),
            ]
        );
        assert_eq!(PricingCalculator::invoice_total(&lines), dec!(54));
    }

    #[rstest]
    #[case(dec!(50), Some(dec!(5)))]
    #[case(dec!(100), Some(dec!(100)))]
    #[case(dec!(250), Some(dec!(100)))]
    #[case(dec!(4), None)]
    fn test_select_tier(#[case] total: Decimal, #[case] threshold: Option<Decimal>) {
        let tiers = tiers();
        assert_eq!(
            PricingCalculator::select_tier(&tiers, total).map(|tier| tier.threshold),
            threshold
        );
    }

    #[test]
    fn test_invoice_adjustment() {
        let tiers = tiers();
        assert_eq!(
            PricingCalculator::invoice_adjustment(&tiers, dec!(50)),
            InvoiceAdjustment::default()
        );

        let adjustment = PricingCalculator::invoice_adjustment(&tiers, dec!(200));
        assert_eq!(adjustment.discount, dec!(4));
        assert_eq!(adjustment.tax, dec!(2));

        let lines = PricingCalculator::invoice_lines(adjustment);
        assert_eq!(lines[0], Line::new("invoice discount", dec!(-4), dec!(-1)));
        assert_eq!(lines[1], Line::new("invoice tax", dec!(2), dec!(1)));
        assert_eq!(lines[2], Line::new("tax", dec!(2), dec!(1)));
    }

    #[test]
    fn test_invoice_adjustment_without_tiers() {
        assert_eq!(
            PricingCalculator::invoice_adjustment(&[], dec!(1000)),
            InvoiceAdjustment::default()
        );
    }
}
