use serde::{Deserialize, Serialize};

/// The outcome of applying a scheduled stock deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockDeductionResult {
    Applied { order_id: i64, adjustments: Vec<StockAdjustment> },
    /// The deduction for this order was applied earlier.
    AlreadyApplied(i64),
    /// No deduction was ever scheduled for this order.
    NotScheduled(i64),
}

impl StockDeductionResult {
    pub fn order_id(&self) -> i64 {
        match self {
            Self::Applied { order_id, .. } => *order_id,
            Self::AlreadyApplied(id) | Self::NotScheduled(id) => *id,
        }
    }

    pub fn adjustments(&self) -> &[StockAdjustment] {
        match self {
            Self::Applied { adjustments, .. } => adjustments,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub product_id: i64,
    pub requested: i64,
    pub deducted: i64,
}

impl StockAdjustment {
    pub fn shortfall(&self) -> i64 {
        self.requested - self.deducted
    }
}
