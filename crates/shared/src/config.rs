//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::CostFlow;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Chart of accounts the posting engine validates against.
    #[serde(default)]
    pub chart: ChartConfig,
    /// Defaults applied to entries the engine creates on its own.
    #[serde(default)]
    pub posting: PostingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Account lists the chart of accounts is derived from.
///
/// Every list is optional; names must be unique across all of them once the
/// derived accounts (`cost of X`, `revenue of X`, ...) are added.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartConfig {
    /// Debit-normal asset accounts.
    #[serde(default)]
    pub assets: Vec<String>,
    /// Contra-asset accounts (accumulated depreciation and the like).
    #[serde(default)]
    pub contra_assets: Vec<String>,
    /// Cash and cash-equivalent accounts.
    #[serde(default)]
    pub cash_equivalents: Vec<String>,
    /// Credit-normal liability accounts.
    #[serde(default)]
    pub liabilities: Vec<String>,
    /// Contra-liability accounts.
    #[serde(default)]
    pub contra_liabilities: Vec<String>,
    /// Credit-normal equity accounts.
    #[serde(default)]
    pub equity: Vec<String>,
    /// Contra-equity accounts (drawings, treasury stock).
    #[serde(default)]
    pub contra_equity: Vec<String>,
    /// Revenue accounts.
    #[serde(default)]
    pub revenues: Vec<String>,
    /// Expense accounts.
    #[serde(default)]
    pub expenses: Vec<String>,
    /// Temporary accounts closed with a debit balance.
    #[serde(default)]
    pub temporary_debit: Vec<String>,
    /// Temporary accounts closed with a credit balance.
    #[serde(default)]
    pub temporary_credit: Vec<String>,
    /// Inventory-tracked accounts.
    #[serde(default)]
    pub inventory: Vec<InventoryItemConfig>,
    /// Service accounts sold without stock.
    #[serde(default)]
    pub services: Vec<ServiceItemConfig>,
    /// Invoice-level discount/tax tiers, ascending by threshold.
    #[serde(default)]
    pub invoice_tiers: Vec<InvoiceTierConfig>,
    /// Replaces the discount of every inventory and service account.
    #[serde(default)]
    pub discount_override: Option<Decimal>,
}

/// An inventory-tracked account.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItemConfig {
    /// Account name.
    pub name: String,
    /// Cost flow used when stock is sold.
    pub cost_flow: CostFlow,
    /// Unit sale price.
    pub price: Decimal,
    /// Discount: negative = absolute per unit, positive = rate, zero = none.
    #[serde(default)]
    pub discount: Decimal,
    /// Tax: negative = absolute per unit, positive = rate, zero = none.
    #[serde(default)]
    pub tax: Decimal,
}

/// A service account.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceItemConfig {
    /// Account name.
    pub name: String,
    /// Unit sale price.
    pub price: Decimal,
    /// Discount: negative = absolute per unit, positive = rate, zero = none.
    #[serde(default)]
    pub discount: Decimal,
    /// Tax: negative = absolute per unit, positive = rate, zero = none.
    #[serde(default)]
    pub tax: Decimal,
}

/// One invoice discount/tax tier.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceTierConfig {
    /// Minimum invoice total (before tax) the tier applies to.
    pub threshold: Decimal,
    /// Invoice discount: negative = absolute, positive = rate.
    #[serde(default)]
    pub discount: Decimal,
    /// Invoice tax: negative = absolute, positive = rate.
    #[serde(default)]
    pub tax: Decimal,
}

/// Defaults for entries the engine posts by itself (lot expiry).
#[derive(Debug, Clone, Deserialize)]
pub struct PostingConfig {
    /// Author recorded on system entries.
    #[serde(default = "default_system_author")]
    pub system_author: String,
    /// Whether expired lots are written off before a batch is posted.
    #[serde(default = "default_expire_before_posting")]
    pub expire_before_posting: bool,
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            system_author: default_system_author(),
            expire_before_posting: default_expire_before_posting(),
        }
    }
}

fn default_system_author() -> String {
    "system".to_string()
}

fn default_expire_before_posting() -> bool {
    true
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
