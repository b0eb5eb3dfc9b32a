//! Chart of accounts built from configuration.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tally_shared::ChartConfig;
use tally_shared::types::CostFlow;

use super::names;
use super::types::{Account, AccountRole, NormalSide, Tracking};
use crate::error::PostingError;
use crate::pricing::{InvoiceTier, Levy, PriceDiscountTax};

/// Immutable classification of every account the engine accepts.
///
/// Built once from [`ChartConfig`] and passed by reference into every posting.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: BTreeMap<String, Account>,
    prices: BTreeMap<String, PriceDiscountTax>,
    tiers: Vec<InvoiceTier>,
}

impl ChartOfAccounts {
    /// Builds the chart, deriving the per-item and fixed accounts.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::Configuration` if any name, configured or
    /// derived, appears twice.
    pub fn build(config: &ChartConfig) -> Result<Self, PostingError> {
        let mut chart = Self::default();

        let plain = [
            (&config.assets, AccountRole::AssetNormal),
            (&config.contra_assets, AccountRole::AssetContra),
            (&config.cash_equivalents, AccountRole::CashEquivalent),
            (&config.liabilities, AccountRole::LiabilityNormal),
            (&config.contra_liabilities, AccountRole::LiabilityContra),
            (&config.equity, AccountRole::EquityNormal),
            (&config.contra_equity, AccountRole::EquityContra),
            (&config.revenues, AccountRole::Revenue),
            (&config.expenses, AccountRole::Expense),
            (&config.temporary_debit, AccountRole::TemporaryDebit),
            (&config.temporary_credit, AccountRole::TemporaryCredit),
        ];
        for (names, role) in plain {
            for name in names {
                chart.insert(name, role, Tracking::Untracked)?;
            }
        }

        let discount = |configured: Decimal| Levy(config.discount_override.unwrap_or(configured));

        for item in &config.inventory {
            chart.insert(
                &item.name,
                AccountRole::AssetNormal,
                Tracking::Inventory(item.cost_flow),
            )?;
            chart.insert_item_accounts(
                &item.name,
                PriceDiscountTax {
                    price: item.price,
                    discount: discount(item.discount),
                    tax: Levy(item.tax),
                },
            )?;
        }

        for service in &config.services {
            chart.insert(&service.name, AccountRole::Revenue, Tracking::Service)?;
            chart.insert_item_accounts(
                &service.name,
                PriceDiscountTax {
                    price: service.price,
                    discount: discount(service.discount),
                    tax: Levy(service.tax),
                },
            )?;
        }

        chart.insert(names::EXPIRY_EXPENSES, AccountRole::Expense, Tracking::Untracked)?;
        chart.insert(names::TAX, AccountRole::LiabilityNormal, Tracking::Untracked)?;
        chart.insert(
            names::INVOICE_DISCOUNT,
            AccountRole::TemporaryCredit,
            Tracking::Untracked,
        )?;
        chart.insert(names::INVOICE_TAX, AccountRole::Tax, Tracking::Untracked)?;

        chart.tiers = config
            .invoice_tiers
            .iter()
            .map(|tier| InvoiceTier {
                threshold: tier.threshold,
                discount: Levy(tier.discount),
                tax: Levy(tier.tax),
            })
            .collect();

        tracing::debug!(
            accounts = chart.accounts.len(),
            tiers = chart.tiers.len(),
            "Chart of accounts built"
        );

        Ok(chart)
    }

    fn insert(&mut self, name: &str, role: AccountRole, tracking: Tracking) -> Result<(), PostingError> {
        if self.accounts.contains_key(name) {
            return Err(PostingError::Configuration(format!(
                "Duplicate account name: {name}"
            )));
        }
        self.accounts.insert(
            name.to_string(),
            Account {
                name: name.to_string(),
                role,
                tracking,
            },
        );
        Ok(())
    }

    fn insert_item_accounts(&mut self, item: &str, row: PriceDiscountTax) -> Result<(), PostingError> {
        self.insert(&names::cost_of(item), AccountRole::CostOfGoods, Tracking::Untracked)?;
        self.insert(&names::discount_of(item), AccountRole::Discount, Tracking::Untracked)?;
        self.insert(&names::tax_of(item), AccountRole::Tax, Tracking::Untracked)?;
        self.insert(&names::revenue_of(item), AccountRole::Revenue, Tracking::Untracked)?;
        self.prices.insert(item.to_string(), row);
        Ok(())
    }

    /// Looks up an account.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::Configuration` for an unknown name.
    pub fn account(&self, name: &str) -> Result<&Account, PostingError> {
        self.accounts
            .get(name)
            .ok_or_else(|| PostingError::Configuration(format!("Unknown account: {name}")))
    }

    /// Returns true if the account exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.accounts.contains_key(name)
    }

    /// Role of an account.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::Configuration` for an unknown name.
    pub fn role(&self, name: &str) -> Result<AccountRole, PostingError> {
        self.account(name).map(|account| account.role)
    }

    /// Normal side of an account.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::Configuration` for an unknown name.
    pub fn normal_side(&self, name: &str) -> Result<NormalSide, PostingError> {
        self.role(name).map(AccountRole::normal_side)
    }

    /// Returns true if the account is exempt from the solvency check.
    ///
    /// # Errors
    ///
    /// Returns `PostingError::Configuration` for an unknown name.
    pub fn is_equity_side(&self, name: &str) -> Result<bool, PostingError> {
        self.role(name).map(AccountRole::is_equity_side)
    }

    /// Cost flow of an inventory account, `None` for anything else.
    #[must_use]
    pub fn cost_flow(&self, name: &str) -> Option<CostFlow> {
        self.accounts.get(name).and_then(Account::cost_flow)
    }

    /// Returns true if the account is a service.
    #[must_use]
    pub fn is_service(&self, name: &str) -> bool {
        self.accounts.get(name).is_some_and(Account::is_service)
    }

    /// Price, discount and tax of an inventory or service account.
    #[must_use]
    pub fn price_row(&self, name: &str) -> Option<&PriceDiscountTax> {
        self.prices.get(name)
    }

    /// Invoice tiers, in configured order.
    #[must_use]
    pub fn invoice_tiers(&self) -> &[InvoiceTier] {
        &self.tiers
    }

    /// Every account, ordered by name.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }
}
