//! Invoice view of a posted entry.

use rust_decimal::Decimal;

use super::types::{InvoiceLine, Line};
use crate::chart::{AccountRole, ChartOfAccounts, names};

/// Builds the invoice rows of a batch, in order of first appearance.
///
/// `revenue of X` and `discount of X` lines merge into one row per item and
/// quantity. The invoice discount and every cash-equivalent line get a row
/// of their own. Everything else stays off the invoice.
#[must_use]
pub fn invoice_view(chart: &ChartOfAccounts, lines: &[Line]) -> Vec<InvoiceLine> {
    let mut rows: Vec<InvoiceLine> = Vec::new();

    for line in lines {
        if let Some(item) = names::revenue_item(&line.account) {
            let row = item_row(&mut rows, item, line.quantity);
            row.gross += line.value;
            row.price = if row.quantity.is_zero() {
                Decimal::ZERO
            } else {
                row.gross / row.quantity
            };
            row.net = row.gross - row.discount;
        } else if let Some(item) = names::discount_item(&line.account) {
            let row = item_row(&mut rows, item, line.quantity);
            row.discount += line.value;
            row.net = row.gross - row.discount;
        } else if line.account == names::INVOICE_DISCOUNT {
            rows.push(InvoiceLine {
                account: line.account.clone(),
                quantity: line.quantity.abs(),
                price: Decimal::ZERO,
                gross: Decimal::ZERO,
                discount: -line.value,
                net: line.value,
            });
        } else if chart
            .role(&line.account)
            .is_ok_and(|role| role == AccountRole::CashEquivalent)
        {
            rows.push(InvoiceLine {
                account: line.account.clone(),
                quantity: line.quantity,
                price: line.price(),
                gross: line.value,
                discount: Decimal::ZERO,
                net: line.value,
            });
        }
    }

    rows
}

fn item_row<'a>(rows: &'a mut Vec<InvoiceLine>, item: &str, quantity: Decimal) -> &'a mut InvoiceLine {
    let position = rows
        .iter()
        .position(|row| row.account == item && row.quantity == quantity);
    let index = position.unwrap_or_else(|| {
        rows.push(InvoiceLine {
            account: item.to_string(),
            quantity,
            price: Decimal::ZERO,
            gross: Decimal::ZERO,
            discount: Decimal::ZERO,
            net: Decimal::ZERO,
        });
        rows.len() - 1
    });
    &mut rows[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_shared::ChartConfig;

    #[test]
    fn test_invoice_rows() {
        let chart = ChartOfAccounts::build(&ChartConfig {
            cash_equivalents: vec!["cash".into()],
            ..ChartConfig::default()
        })
        .unwrap();
        let lines = vec![
            Line::new("cash", dec!(52), dec!(1)),
            Line::new("revenue of book", dec!(60), dec!(3)),
            Line::new("discount of book", dec!(6), dec!(3)),
            Line::new("tax of book", dec!(3), dec!(3)),
            Line::new("invoice discount", dec!(-2), dec!(-1)),
        ];

        let rows = invoice_view(&chart, &lines);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].account, "cash");
        assert_eq!(rows[0].net, dec!(52));
        assert_eq!(
            rows[1],
            InvoiceLine {
                account: "book".into(),
                quantity: dec!(3),
                price: dec!(20),
                gross: dec!(60),
                discount: dec!(6),
                net: dec!(54),
            }
        );
        assert_eq!(rows[2].account, "invoice discount");
        assert_eq!(rows[2].discount, dec!(2));
        assert_eq!(rows[2].net, dec!(-2));
    }

    #[test]
    fn test_discount_without_revenue_row() {
        let chart = ChartOfAccounts::default();
        let rows = invoice_view(&chart, &[Line::new("discount of pen", dec!(1), dec!(2))]);
        assert_eq!(rows[0].account, "pen");
        assert_eq!(rows[0].net, dec!(-1));
    }
}
