//! Expansion of abbreviated sales into itemized lines.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::types::Line;
use crate::chart::{ChartOfAccounts, names};
use crate::costing::{CostingEngine, LotOrder, LotReservations};
use crate::error::PostingError;
use crate::pricing::PricingCalculator;
use crate::store::LotStore;

/// Auto-completion of sale and service lines.
pub struct AutoCompleter;

impl AutoCompleter {
    /// Expands aggregated lines.
    ///
    /// - inventory line with negative quantity: costed from the lots, then
    ///   paired with `cost of X` and the item's revenue, discount and tax
    /// - service line: replaced by its revenue, discount and tax
    /// - anything else: kept as is
    ///
    /// Invoice-level discount and tax lines for the selected tier close the batch.
    ///
    /// Outflows are costed through `reservations` in line order; inventory
    /// received on the way is dated `date`.
    pub async fn complete<S: LotStore>(
        chart: &ChartOfAccounts,
        store: &mut S,
        reservations: &mut LotReservations,
        lines: Vec<Line>,
        date: NaiveDateTime,
    ) -> Result<Vec<Line>, PostingError> {
        let mut completed = Vec::with_capacity(lines.len());
        let mut expansion = Vec::new();

        for line in lines {
            if let Some(flow) = chart.cost_flow(&line.account).filter(|_| line.quantity < Decimal::ZERO) {
                let cost = CostingEngine::reserve(
                    store,
                    reservations,
                    &line.account,
                    line.barcode.as_deref(),
                    line.quantity,
                    LotOrder::for_flow(flow),
                )
                .await?;
                let sold = line.quantity.abs();

                if let Some(row) = chart.price_row(&line.account) {
                    expansion.extend(PricingCalculator::expand_account(&line.account, row, sold));
                }
                let cost_account = names::cost_of(&line.account);
                completed.push(Line {
                    value: -cost,
                    ..line
                });
                completed.push(Line::new(cost_account, cost, sold));
            } else if chart.is_service(&line.account) {
                if let Some(row) = chart.price_row(&line.account) {
                    expansion.extend(PricingCalculator::expand_account(
                        &line.account,
                        row,
                        line.quantity,
                    ));
                }
            } else {
                if chart.cost_flow(&line.account).is_some() && line.quantity > Decimal::ZERO {
                    reservations.receive(
                        &line.account,
                        line.barcode.as_deref(),
                        line.price(),
                        line.quantity,
                        date,
                    );
                }
                completed.push(line);
            }
        }

        let total = PricingCalculator::invoice_total(&expansion);
        let adjustment = PricingCalculator::invoice_adjustment(chart.invoice_tiers(), total);
        tracing::debug!(
            total = %total,
            discount = %adjustment.discount,
            tax = %adjustment.tax,
            "Auto-completed invoice"
        );

        completed.extend(expansion);
        completed.extend(PricingCalculator::invoice_lines(adjustment));
        Ok(completed)
    }
}
