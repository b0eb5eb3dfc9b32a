//! Pure consumption planning.

use rust_decimal::Decimal;

use super::types::{ConsumptionPlan, LotDraw, Shortfall, StoredLot};

/// Plans taking `quantity` units from `lots`, visited in the given order.
///
/// The sign of `quantity` is ignored. Each lot contributes
/// `min(remaining need, lot quantity) * lot price`.
///
/// # Errors
///
/// Returns the [`Shortfall`] if the lots hold less than requested.
pub fn plan_consumption(lots: &[StoredLot], quantity: Decimal) -> Result<ConsumptionPlan, Shortfall> {
    let requested = quantity.abs();
    let mut needed = requested;
    let mut plan = ConsumptionPlan::default();

    for stored in lots {
        if needed.is_zero() {
            break;
        }
        if stored.lot.quantity <= Decimal::ZERO {
            continue;
        }

        let taken = needed.min(stored.lot.quantity);
        needed -= taken;
        plan.cost += taken * stored.lot.price;
        plan.draws.push(LotDraw {
            lot_id: stored.id,
            taken,
            remaining: stored.lot.quantity - taken,
            price: stored.lot.price,
        });
    }

    if needed > Decimal::ZERO {
        return Err(Shortfall {
            requested,
            missing: needed,
        });
    }

    Ok(plan)
}
