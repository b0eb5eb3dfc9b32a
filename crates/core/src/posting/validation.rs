//! Business rule validation for posting batches.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::types::{AdjustingMethod, Line};
use crate::chart::ChartOfAccounts;
use crate::error::PostingError;

/// Largest signed total still considered balanced.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Checks that an expiry date is given exactly when the method needs one.
///
/// # Errors
///
/// Returns `PostingError::ConfigurationMismatch` otherwise.
pub fn check_method_expiry(
    method: AdjustingMethod,
    expiry: Option<NaiveDateTime>,
) -> Result<(), PostingError> {
    if method.requires_expiry() == expiry.is_some() {
        Ok(())
    } else {
        Err(PostingError::ConfigurationMismatch {
            method: method.to_string(),
            expiry_given: expiry.is_some(),
        })
    }
}

/// Checks that an explicit posting date does not fall after an explicit expiry.
///
/// # Errors
///
/// Returns `PostingError::InvalidDateRange` otherwise.
pub fn check_dates(
    date: Option<NaiveDateTime>,
    expiry: Option<NaiveDateTime>,
) -> Result<(), PostingError> {
    match (date, expiry) {
        (Some(date), Some(expiry)) if date > expiry => {
            Err(PostingError::InvalidDateRange { date, expiry })
        }
        _ => Ok(()),
    }
}

/// Checks that value and quantity of every line share their sign.
///
/// # Errors
///
/// Returns `PostingError::SignMismatch` for the first offending line.
pub fn check_signs(lines: &[Line]) -> Result<(), PostingError> {
    for line in lines {
        let opposite = (line.value > Decimal::ZERO && line.quantity < Decimal::ZERO)
            || (line.value < Decimal::ZERO && line.quantity > Decimal::ZERO);
        if opposite {
            return Err(PostingError::SignMismatch {
                account: line.account.clone(),
                value: line.value,
                quantity: line.quantity,
            });
        }
    }
    Ok(())
}

/// Checks that no non-equity account goes below zero.
///
/// `prior` holds the balance of each account before the batch; lines of one
/// account are applied in order.
///
/// # Errors
///
/// Returns `PostingError::InsufficientBalance` for the first line that would
/// overdraw its account, or `PostingError::Configuration` for an unknown account.
pub fn check_solvency(
    chart: &ChartOfAccounts,
    lines: &[Line],
    prior: &BTreeMap<String, Decimal>,
) -> Result<(), PostingError> {
    let mut running: BTreeMap<&str, Decimal> = BTreeMap::new();

    for line in lines {
        if chart.is_equity_side(&line.account)? {
            continue;
        }
        let balance = running
            .entry(line.account.as_str())
            .or_insert_with(|| prior.get(&line.account).copied().unwrap_or_default());
        if *balance + line.value < Decimal::ZERO {
            return Err(PostingError::InsufficientBalance {
                account: line.account.clone(),
                balance: *balance,
                value: line.value,
            });
        }
        *balance += line.value;
    }
    Ok(())
}

/// Debit-normal values minus credit-normal values.
///
/// # Errors
///
/// Returns `PostingError::Configuration` for an unknown account.
pub fn signed_total(chart: &ChartOfAccounts, lines: &[Line]) -> Result<Decimal, PostingError> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        Ok(total + chart.normal_side(&line.account)?.signed(line.value))
    })
}

/// Checks that the batch balances within [`BALANCE_TOLERANCE`].
///
/// # Errors
///
/// Returns `PostingError::UnbalancedEntry` with the signed total otherwise.
pub fn check_balanced(chart: &ChartOfAccounts, lines: &[Line]) -> Result<(), PostingError> {
    let difference = signed_total(chart, lines)?;
    if difference.abs() > BALANCE_TOLERANCE {
        return Err(PostingError::UnbalancedEntry { difference });
    }
    Ok(())
}
