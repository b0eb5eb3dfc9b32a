//! Names of the accounts the chart derives on its own.

/// Expense account that absorbs expired stock.
pub const EXPIRY_EXPENSES: &str = "expair_expenses";

/// Tax payable.
pub const TAX: &str = "tax";

/// Invoice-level discount.
pub const INVOICE_DISCOUNT: &str = "invoice discount";

/// Invoice-level tax expense, offset by [`TAX`].
pub const INVOICE_TAX: &str = "invoice tax";

const COST_OF: &str = "cost of ";
const DISCOUNT_OF: &str = "discount of ";
const TAX_OF: &str = "tax of ";
const REVENUE_OF: &str = "revenue of ";

/// `cost of X`
#[must_use]
pub fn cost_of(item: &str) -> String {
    format!("{COST_OF}{item}")
}

/// `discount of X`
#[must_use]
pub fn discount_of(item: &str) -> String {
    format!("{DISCOUNT_OF}{item}")
}

/// `tax of X`
#[must_use]
pub fn tax_of(item: &str) -> String {
    format!("{TAX_OF}{item}")
}

/// `revenue of X`
#[must_use]
pub fn revenue_of(item: &str) -> String {
    format!("{REVENUE_OF}{item}")
}

/// Item behind a `revenue of X` account.
#[must_use]
pub fn revenue_item(account: &str) -> Option<&str> {
    account.strip_prefix(REVENUE_OF)
}

/// Item behind a `discount of X` account.
#[must_use]
pub fn discount_item(account: &str) -> Option<&str> {
    account.strip_prefix(DISCOUNT_OF)
}
