//! Account classification types.

use serde::{Deserialize, Serialize};
use tally_shared::types::CostFlow;

/// Side on which an account's balance grows.
///
/// - Debit-normal: balance += value (assets, expenses, contras of credit accounts)
/// - Credit-normal: balance grows on the credit side, so it counts against debits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSide {
    /// Debit-normal account.
    Debit,
    /// Credit-normal account.
    Credit,
}

impl NormalSide {
    /// Contribution of a line value to the debit-minus-credit total.
    #[must_use]
    pub fn signed(self, value: rust_decimal::Decimal) -> rust_decimal::Decimal {
        match self {
            Self::Debit => value,
            Self::Credit => -value,
        }
    }
}

/// Role of an account in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    /// Ordinary asset.
    AssetNormal,
    /// Contra asset (accumulated depreciation).
    AssetContra,
    /// Cash or cash equivalent.
    CashEquivalent,
    /// Ordinary liability.
    LiabilityNormal,
    /// Contra liability.
    LiabilityContra,
    /// Ordinary equity.
    EquityNormal,
    /// Contra equity (drawings).
    EquityContra,
    /// Revenue, including `revenue of X`.
    Revenue,
    /// Expense, including `expair_expenses`.
    Expense,
    /// `cost of X`.
    CostOfGoods,
    /// `discount of X`.
    Discount,
    /// `tax of X` and `invoice tax`.
    Tax,
    /// Temporary account closed with a debit balance.
    TemporaryDebit,
    /// Temporary account closed with a credit balance, including `invoice discount`.
    TemporaryCredit,
}

impl AccountRole {
    /// Natural balance side of the role.
    #[must_use]
    pub const fn normal_side(self) -> NormalSide {
        match self {
            Self::AssetNormal
            | Self::CashEquivalent
            | Self::LiabilityContra
            | Self::EquityContra
            | Self::Expense
            | Self::CostOfGoods
            | Self::Discount
            | Self::Tax
            | Self::TemporaryDebit => NormalSide::Debit,
            Self::AssetContra
            | Self::LiabilityNormal
            | Self::EquityNormal
            | Self::Revenue
            | Self::TemporaryCredit => NormalSide::Credit,
        }
    }

    /// Equity and temporary accounts may carry a negative balance.
    #[must_use]
    pub const fn is_equity_side(self) -> bool {
        matches!(
            self,
            Self::EquityNormal | Self::EquityContra | Self::TemporaryDebit | Self::TemporaryCredit
        )
    }
}

/// How the engine follows the stock behind an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracking {
    /// Plain account.
    Untracked,
    /// Stock held in lots, costed with the given flow.
    Inventory(CostFlow),
    /// Sold without stock.
    Service,
}

/// A classified account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account name.
    pub name: String,
    /// Role in the chart.
    pub role: AccountRole,
    /// Inventory or service tracking.
    pub tracking: Tracking,
}

impl Account {
    /// Cost flow of an inventory-tracked account.
    #[must_use]
    pub const fn cost_flow(&self) -> Option<CostFlow> {
        match self.tracking {
            Tracking::Inventory(flow) => Some(flow),
            Tracking::Untracked | Tracking::Service => None,
        }
    }

    /// Returns true if the account holds inventory lots.
    #[must_use]
    pub const fn is_inventory(&self) -> bool {
        matches!(self.tracking, Tracking::Inventory(_))
    }

    /// Returns true if the account is a service.
    #[must_use]
    pub const fn is_service(&self) -> bool {
        matches!(self.tracking, Tracking::Service)
    }
}
