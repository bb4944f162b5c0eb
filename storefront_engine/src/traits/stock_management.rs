use thiserror::Error;

use crate::traits::StockDeductionResult;

#[derive(Debug, Clone, Error)]
pub enum StockError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for StockError {
    fn from(e: sqlx::Error) -> Self {
        StockError::DatabaseError(e.to_string())
    }
}

/// Stock deductions are scheduled at checkout (one per order) and applied later, at least once. Applying the same
/// deduction more than once has no further effect.
#[allow(async_fn_in_trait)]
pub trait StockManagement {
    /// Ids of orders whose stock deduction has not been applied yet, oldest first.
    async fn pending_stock_deductions(&self, limit: i64) -> Result<Vec<i64>, StockError>;

    /// Decrements the stock of every product in the order by the purchased quantity, in a single transaction.
    /// Stock never drops below zero; any quantity that could not be deducted is reported as a shortfall.
    async fn apply_stock_deduction(&self, order_id: i64) -> Result<StockDeductionResult, StockError>;
}
