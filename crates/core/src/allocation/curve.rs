//! Allocation curves.
//!
//! With `V = |value|`, `T` the total calendar minutes, `s` the minutes before
//! an instance and `d` its length:
//!
//! - linear: `d * V / T`
//! - exponential: `base^(s + d) - base^s`
//! - logarithmic: `V / base^s - V / base^(s + d)`
//!
//! where `base = V^(1/T)`. The last instance takes whatever is left of `V`,
//! so the slices always add back up to the original value.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::calendar::WindowInstance;
use crate::error::PostingError;
use crate::posting::Line;

/// Decimal places kept on every slice but the last.
pub const SLICE_SCALE: u32 = 12;

/// Shape of the spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    /// Proportional to window length.
    Linear,
    /// Growing slices.
    Exponential,
    /// Shrinking slices.
    Logarithmic,
}

/// One slice of a spread line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedLine {
    /// The slice.
    pub line: Line,
    /// Effective date, the window start.
    pub date: NaiveDateTime,
    /// Expiry date, the window end.
    pub expiry: NaiveDateTime,
}

/// Time-based allocation engine.
pub struct AllocationEngine;

impl AllocationEngine {
    /// Splits `total` over the instances along `curve`.
    ///
    /// `total` is expected non-negative.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::InvalidCalendar` when there are no minutes to
    /// spread over, and `PostingError::Configuration` if the curve cannot be
    /// evaluated for `total`.
    pub fn slices(
        curve: Curve,
        total: Decimal,
        instances: &[WindowInstance],
    ) -> Result<Vec<Decimal>, PostingError> {
        let minutes: i64 = instances.iter().map(|instance| instance.minutes).sum();
        if minutes <= 0 {
            return Err(PostingError::InvalidCalendar(
                "Calendar has no business minutes".to_string(),
            ));
        }
        let span = Decimal::from(minutes);

        let mut slices = Vec::with_capacity(instances.len());
        let mut elapsed = Decimal::ZERO;
        let mut allocated = Decimal::ZERO;

        for (index, instance) in instances.iter().enumerate() {
            let length = Decimal::from(instance.minutes);
            let slice = if index + 1 == instances.len() {
                total - allocated
            } else {
                let exact = match curve {
                    Curve::Linear => length * total / span,
                    Curve::Exponential => {
                        Self::power(total, elapsed + length, span)? - Self::power(total, elapsed, span)?
                    }
                    Curve::Logarithmic => {
                        total / Self::power(total, elapsed, span)?
                            - total / Self::power(total, elapsed + length, span)?
                    }
                };
                exact.round_dp_with_strategy(SLICE_SCALE, RoundingStrategy::MidpointNearestEven)
            };
            allocated += slice;
            elapsed += length;
            slices.push(slice);
        }

        Ok(slices)
    }

    /// `V^(x / T)`, evaluated as `exp(ln(V) * x / T)`.
    fn power(value: Decimal, exponent: Decimal, span: Decimal) -> Result<Decimal, PostingError> {
        if exponent.is_zero() || value == Decimal::ONE {
            return Ok(Decimal::ONE);
        }
        value
            .checked_ln()
            .and_then(|ln| (ln * exponent / span).checked_exp())
            .filter(|power| !power.is_zero())
            .ok_or_else(|| {
                PostingError::Configuration(format!("Cannot spread value {value} along a curve"))
            })
    }

    /// Spreads one line over the instances.
    ///
    /// Each slice keeps the sign of the line; its quantity is proportional
    /// to its value and the last slice absorbs any rounding.
    ///
    /// # Errors
    ///
    /// See [`AllocationEngine::slices`].
    pub fn spread(
        line: &Line,
        curve: Curve,
        instances: &[WindowInstance],
    ) -> Result<Vec<AllocatedLine>, PostingError> {
        let magnitude = line.value.abs();
        let slices = if magnitude.is_zero() {
            vec![Decimal::ZERO; instances.len()]
        } else {
            Self::slices(curve, magnitude, instances)?
        };

        let mut quantity_left = line.quantity;
        let mut allocated = Vec::with_capacity(slices.len());

        for (index, (slice, instance)) in slices.into_iter().zip(instances).enumerate() {
            let value = if line.value.is_sign_negative() { -slice } else { slice };
            let quantity = if index + 1 == instances.len() {
                quantity_left
            } else if magnitude.is_zero() {
                Decimal::ZERO
            } else {
                (slice * line.quantity / magnitude)
                    .round_dp_with_strategy(SLICE_SCALE, RoundingStrategy::MidpointNearestEven)
            };
            quantity_left -= quantity;

            allocated.push(AllocatedLine {
                line: Line {
                    account: line.account.clone(),
                    value,
                    quantity,
                    barcode: line.barcode.clone(),
                },
                date: instance.start,
                expiry: instance.end,
            });
        }

        Ok(allocated)
    }

    /// Spreads every line and lays the slices out window by window.
    ///
    /// Slices are computed as a (line, window) grid, then read column-wise so
    /// every line's slice for the first window comes before any slice of the
    /// second.
    ///
    /// # Errors
    ///
    /// See [`AllocationEngine::slices`].
    pub fn spread_all(
        lines: &[Line],
        curve: Curve,
        instances: &[WindowInstance],
    ) -> Result<Vec<AllocatedLine>, PostingError> {
        let grid = lines
            .iter()
            .map(|line| Self::spread(line, curve, instances))
            .collect::<Result<Vec<_>, _>>()?;

        let mut flattened = Vec::with_capacity(lines.len() * instances.len());
        for window in 0..instances.len() {
            for row in &grid {
                if let Some(cell) = row.get(window) {
                    flattened.push(cell.clone());
                }
            }
        }
        Ok(flattened)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::BusinessCalendar;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn week() -> Vec<WindowInstance> {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 7, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        BusinessCalendar::default().instances(start, end).unwrap()
    }

    #[test]
    fn test_linear_over_full_days_is_exact() {
        let slices = AllocationEngine::slices(Curve::Linear, dec!(700), &week()).unwrap();
        assert_eq!(slices, vec![dec!(100); 7]);
    }

    #[test]
    fn test_exponential_slices_grow() {
        let slices = AllocationEngine::slices(Curve::Exponential, dec!(1000), &week()).unwrap();

        assert_eq!(slices.iter().copied().sum::<Decimal>(), dec!(1000));
        for pair in slices[..6].windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_logarithmic_slices_shrink() {
        let slices = AllocationEngine::slices(Curve::Logarithmic, dec!(1000), &week()).unwrap();

        assert_eq!(slices.iter().copied().sum::<Decimal>(), dec!(1000));
        for pair in slices[..6].windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_spread_keeps_sign_and_totals() {
        let line = Line::new("accumulated depreciation", dec!(-700), dec!(-7));
        let spread = AllocationEngine::spread(&line, Curve::Linear, &week()).unwrap();

        assert_eq!(spread.len(), 7);
        assert!(spread.iter().all(|slice| slice.line.value == dec!(-100)));
        assert!(spread.iter().all(|slice| slice.line.quantity == dec!(-1)));
        assert_eq!(spread[0].date.date(), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(spread[6].expiry.date(), NaiveDate::from_ymd_opt(2024, 7, 7).unwrap());
    }

    #[test]
    fn test_spread_all_is_window_major() {
        let instances = &week()[..2];
        let lines = vec![
            Line::new("rent expense", dec!(20), dec!(1)),
            Line::new("prepaid rent", dec!(-20), dec!(-1)),
        ];
        let spread = AllocationEngine::spread_all(&lines, Curve::Linear, instances).unwrap();

        let accounts: Vec<&str> = spread.iter().map(|s| s.line.account.as_str()).collect();
        assert_eq!(
            accounts,
            vec!["rent expense", "prepaid rent", "rent expense", "prepaid rent"]
        );
        assert_eq!(spread[0].date, spread[1].date);
        assert!(spread[1].date < spread[2].date);
    }

    #[test]
    fn test_no_minutes() {
        assert!(matches!(
            AllocationEngine::slices(Curve::Linear, dec!(10), &[]),
            Err(PostingError::InvalidCalendar(_))
        ));
    }
}
