//! Journal posting processor.
//!
//! Runs a batch through resolution, aggregation, correction, auto-completion,
//! validation and allocation, then persists it. Every check happens before the
//! first write.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tally_shared::types::CostFlow;

use super::aggregate::aggregate;
use super::autocomplete::AutoCompleter;
use super::invoice::invoice_view;
use super::reversal::{PendingReversal, ReversalService};
use super::types::{
    AdjustingMethod, EntryHeader, Line, PostedLine, PostingOutcome, PostingRequest,
};
use super::validation;
use crate::allocation::{AllocatedLine, AllocationEngine, BusinessCalendar, WindowSpec};
use crate::chart::ChartOfAccounts;
use crate::costing::{CostingEngine, InventoryLot, LotOrder, LotReservations};
use crate::error::PostingError;
use crate::store::{LedgerStore, LotStore};

/// Description of the entries writing off expired lots.
pub const EXPIRY_DESCRIPTION: &str = "Expired inventory";

/// Posting processor bound to a chart of accounts.
#[derive(Debug, Clone, Copy)]
pub struct PostingProcessor<'a> {
    chart: &'a ChartOfAccounts,
}

impl<'a> PostingProcessor<'a> {
    /// Creates a processor for `chart`.
    #[must_use]
    pub const fn new(chart: &'a ChartOfAccounts) -> Self {
        Self { chart }
    }

    /// Posts a batch as one entry, preceded by the reversal of
    /// `correction_of` when given.
    ///
    /// The store is expected to be a unit of work: on error some writes may
    /// have happened and the caller must not commit.
    pub async fn post<S>(
        &self,
        store: &mut S,
        request: PostingRequest,
    ) -> Result<PostingOutcome, PostingError>
    where
        S: LedgerStore + LotStore,
    {
        let result = self.post_batch(store, request).await;
        if let Err(err) = &result {
            tracing::warn!(error = %err, code = err.error_code(), "Posting rejected");
        }
        result
    }

    async fn post_batch<S>(
        &self,
        store: &mut S,
        request: PostingRequest,
    ) -> Result<PostingOutcome, PostingError>
    where
        S: LedgerStore + LotStore,
    {
        let PostingRequest {
            lines,
            correction_of,
            date,
            expiry,
            adjusting_method,
            auto_complete,
            description,
            author,
            employee,
            calendar,
            now,
        } = request;

        // 1. Method and expiry go together; explicit dates are ordered
        validation::check_method_expiry(adjusting_method, expiry)?;
        validation::check_dates(date, expiry)?;
        let date = date.unwrap_or(now);
        let expiry = expiry.unwrap_or(now);

        // 2. Resolve accounts, then aggregate per (account, barcode)
        let resolved = self.resolve(store, lines, adjusting_method).await?;
        let mut lines = aggregate(&resolved);

        // 3. Load the entry to correct
        let reversal = match correction_of {
            Some(target) => {
                let active = store.active_lines(target, now).await?;
                let reversal = ReversalService::reverse(target, &active, &employee)
                    .ok_or(PostingError::NoPriorEntry(target))?;
                Some(reversal)
            }
            None => None,
        };
        let mut reservations = LotReservations::new();
        if let Some(reversal) = &reversal {
            self.reserve_stock(store, &mut reservations, &reversal.lines, now)
                .await?;
        }

        // 4. Expand sales and services
        if auto_complete {
            lines = AutoCompleter::complete(self.chart, store, &mut reservations, lines, date).await?;
        }
        lines.retain(|line| !line.is_zero());

        // 5. Signs, solvency, balance, stock
        validation::check_signs(&lines)?;
        let prior = self
            .prior_balances(store, &lines, reversal.as_ref(), now)
            .await?;
        validation::check_solvency(self.chart, &lines, &prior)?;
        validation::check_balanced(self.chart, &lines)?;
        if !auto_complete {
            self.reserve_stock(store, &mut reservations, &lines, date)
                .await?;
        }

        // 6. Spread over the calendar
        let placed = Self::place(&lines, adjusting_method, calendar.as_deref(), date, expiry)?;

        // 7. Number the entries; a batch with no lines left gets no number
        let last = store.max_entry_number().await?.unwrap_or(0);
        let reversal_number = reversal.as_ref().map(|_| last + 1);
        let entry_number = (!placed.is_empty()).then(|| reversal_number.unwrap_or(last) + 1);

        // 8. Persist, reversal first
        let mut posted = Vec::with_capacity(placed.len());
        if let (Some(reversal), Some(reversal_number)) = (&reversal, reversal_number) {
            let header = EntryHeader {
                entry_number: reversal_number,
                date: now,
                expiry: now,
                description: reversal.description.clone(),
                name: author.clone(),
                employee_name: employee.clone(),
                posted_at: now,
            };
            posted.extend(reversal.lines.iter().cloned().map(|line| header.stamp(line)));

            store.mark_reversed(reversal.target).await?;
            let deleted = store.delete_pending(reversal.target, now).await?;
            tracing::debug!(
                target = reversal.target,
                deleted,
                "Reversed entry and dropped its pending rows"
            );
        }
        let reversal_rows = posted.len();

        if let Some(entry_number) = entry_number {
            let header = EntryHeader {
                entry_number,
                date,
                expiry,
                description,
                name: author,
                employee_name: employee,
                posted_at: now,
            };
            posted.extend(placed.into_iter().map(|allocated| PostedLine {
                date: allocated.date,
                expiry: allocated.expiry,
                ..header.stamp(allocated.line)
            }));
        }

        store.append_lines(&posted).await?;
        let lots_expire = adjusting_method == AdjustingMethod::Expire;
        self.apply_inventory(store, &posted, reversal_rows, lots_expire, now)
            .await?;

        tracing::info!(
            entry_number = ?entry_number,
            lines = posted.len() - reversal_rows,
            reversed = ?reversal.as_ref().map(|reversal| reversal.target),
            "Entry posted"
        );

        Ok(PostingOutcome {
            invoice: invoice_view(self.chart, &lines),
            lines: posted,
            posted_at: now,
            entry_number: entry_number.or(reversal_number),
        })
    }

    /// Writes off every lot expired before `now` as one entry.
    ///
    /// Returns `None` when nothing expired.
    pub async fn expire_lots<S>(
        &self,
        store: &mut S,
        now: NaiveDateTime,
        author: &str,
        employee: &str,
    ) -> Result<Option<PostingOutcome>, PostingError>
    where
        S: LedgerStore + LotStore,
    {
        let lines = CostingEngine::expire_lots(store, now).await?;
        if lines.is_empty() {
            return Ok(None);
        }

        let entry_number = store.max_entry_number().await?.unwrap_or(0) + 1;
        let header = EntryHeader {
            entry_number,
            date: now,
            expiry: now,
            description: EXPIRY_DESCRIPTION.to_string(),
            name: author.to_string(),
            employee_name: employee.to_string(),
            posted_at: now,
        };
        let posted: Vec<PostedLine> = lines.into_iter().map(|line| header.stamp(line)).collect();
        store.append_lines(&posted).await?;

        let weighted: BTreeSet<String> = posted
            .iter()
            .filter(|row| {
                self.chart
                    .cost_flow(&row.account)
                    .is_some_and(CostFlow::is_weighted_average)
            })
            .map(|row| row.account.clone())
            .collect();
        let weighted: Vec<String> = weighted.into_iter().collect();
        CostingEngine::reprice(store, &weighted, now).await?;

        tracing::info!(entry_number, lines = posted.len(), "Expired lots written off");

        Ok(Some(PostingOutcome {
            lines: posted,
            invoice: Vec::new(),
            posted_at: now,
            entry_number: Some(entry_number),
        }))
    }

    /// Fills empty accounts from barcodes and checks every account exists.
    async fn resolve<S: LedgerStore>(
        &self,
        store: &mut S,
        lines: Vec<Line>,
        method: AdjustingMethod,
    ) -> Result<Vec<Line>, PostingError> {
        let mut resolved = Vec::with_capacity(lines.len());

        for mut line in lines {
            if line.account.is_empty() {
                let barcode = line.barcode.clone().unwrap_or_default();
                if barcode.is_empty() {
                    return Err(PostingError::UnresolvedBarcode(barcode));
                }
                let found = store.latest_account_for_barcode(&barcode).await?;
                line.account = found.ok_or(PostingError::UnresolvedBarcode(barcode))?;
            }

            let account = self.chart.account(&line.account)?;
            if account.is_inventory() && !method.allowed_for_inventory() {
                return Err(PostingError::InvalidAdjustingMethod {
                    account: line.account.clone(),
                    method: method.to_string(),
                });
            }
            resolved.push(line);
        }

        Ok(resolved)
    }

    /// Balance of every non-equity account of the batch as of `now`,
    /// including what a pending reversal adds.
    async fn prior_balances<S: LedgerStore>(
        &self,
        store: &mut S,
        lines: &[Line],
        reversal: Option<&PendingReversal>,
        now: NaiveDateTime,
    ) -> Result<BTreeMap<String, Decimal>, PostingError> {
        let deltas = reversal.map(PendingReversal::deltas).unwrap_or_default();
        let mut prior = BTreeMap::new();

        for line in lines {
            if prior.contains_key(&line.account) || self.chart.is_equity_side(&line.account)? {
                continue;
            }
            let delta = deltas.get(line.account.as_str()).copied().unwrap_or_default();
            let balance = store.net_value(&line.account, now).await? + delta;
            prior.insert(line.account.clone(), balance);
        }

        Ok(prior)
    }

    /// Walks the inventory rows in persisting order, receiving inflows and
    /// reserving outflows, so a shortage surfaces before any write.
    async fn reserve_stock<S: LotStore>(
        &self,
        store: &mut S,
        reservations: &mut LotReservations,
        lines: &[Line],
        date: NaiveDateTime,
    ) -> Result<(), PostingError> {
        for line in lines {
            let Some(flow) = self.chart.cost_flow(&line.account) else {
                continue;
            };
            if line.quantity > Decimal::ZERO {
                reservations.receive(
                    &line.account,
                    line.barcode.as_deref(),
                    line.price(),
                    line.quantity,
                    date,
                );
            } else if line.quantity < Decimal::ZERO {
                CostingEngine::reserve(
                    store,
                    reservations,
                    &line.account,
                    line.barcode.as_deref(),
                    line.quantity,
                    LotOrder::for_flow(flow),
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Dates every line, spreading it over the calendar for curve methods.
    fn place(
        lines: &[Line],
        method: AdjustingMethod,
        calendar: Option<&[WindowSpec]>,
        date: NaiveDateTime,
        expiry: NaiveDateTime,
    ) -> Result<Vec<AllocatedLine>, PostingError> {
        let Some(curve) = method.curve() else {
            return Ok(lines
                .iter()
                .cloned()
                .map(|line| AllocatedLine { line, date, expiry })
                .collect());
        };

        let calendar = match calendar {
            Some(specs) => BusinessCalendar::parse(specs)?,
            None => BusinessCalendar::default(),
        };
        let instances = calendar.instances(date, expiry)?;
        let mut spread = AllocationEngine::spread_all(lines, curve, &instances)?;
        spread.retain(|allocated| !allocated.line.is_zero());

        tracing::debug!(
            curve = ?curve,
            windows = instances.len(),
            slices = spread.len(),
            "Spread adjusting entry"
        );
        Ok(spread)
    }

    /// Receives or consumes lots for every inventory row, then reprices the
    /// weighted-average accounts touched.
    ///
    /// Only rows of an `expire` entry keep their expiry on the lot; every
    /// other lot never expires.
    async fn apply_inventory<S>(
        &self,
        store: &mut S,
        rows: &[PostedLine],
        reversal_rows: usize,
        lots_expire: bool,
        now: NaiveDateTime,
    ) -> Result<(), PostingError>
    where
        S: LedgerStore + LotStore,
    {
        let mut weighted = BTreeSet::new();

        for (index, row) in rows.iter().enumerate() {
            let Some(flow) = self.chart.cost_flow(&row.account) else {
                continue;
            };

            if row.quantity > Decimal::ZERO {
                let expiry = if lots_expire && index >= reversal_rows {
                    row.expiry
                } else {
                    NaiveDateTime::MAX
                };
                CostingEngine::receive(
                    store,
                    InventoryLot {
                        date: row.date,
                        account: row.account.clone(),
                        price: row.price,
                        quantity: row.quantity,
                        barcode: row.barcode.clone(),
                        expiry,
                        name: row.name.clone(),
                        employee_name: row.employee_name.clone(),
                        posted_at: row.posted_at,
                    },
                )
                .await?;
            } else if row.quantity < Decimal::ZERO {
                CostingEngine::consume(
                    store,
                    &row.account,
                    row.barcode.as_deref(),
                    row.quantity,
                    LotOrder::for_flow(flow),
                )
                .await?;
            }

            if flow.is_weighted_average() {
                weighted.insert(row.account.clone());
            }
        }

        if !weighted.is_empty() {
            let as_of = rows.iter().map(|row| row.date).fold(now, |latest, date| latest.max(date));
            let accounts: Vec<String> = weighted.into_iter().collect();
            CostingEngine::reprice(store, &accounts, as_of).await?;
        }
        Ok(())
    }
}
