use std::{fmt::Debug, sync::Arc};

use log::*;

use crate::traits::{CatalogCache, StockDeductionResult, StockError, StockManagement};

/// `StockApi` applies the stock deductions that checkout schedules.
///
/// Deductions are normally triggered by the `OrderCreated` event. A periodic sweep over
/// [`StockApi::process_pending`] picks up anything the event path missed, e.g. after a restart.
pub struct StockApi<B> {
    db: B,
    cache: Arc<dyn CatalogCache>,
}

impl<B> Debug for StockApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StockApi")
    }
}

impl<B> StockApi<B> {
    pub fn new(db: B, cache: Arc<dyn CatalogCache>) -> Self {
        Self { db, cache }
    }
}

impl<B> StockApi<B>
where B: StockManagement
{
    /// Applies the stock deduction for the order. Calling this again for the same order has no effect.
    /// The cached entries of every adjusted product are invalidated.
    pub async fn deduct(&self, order_id: i64) -> Result<StockDeductionResult, StockError> {
        let result = self.db.apply_stock_deduction(order_id).await?;
        match &result {
            StockDeductionResult::Applied { adjustments, .. } => {
                for adjustment in adjustments {
                    self.cache.invalidate(adjustment.product_id);
                }
                info!("📦 Stock deducted for order #{order_id} ({} products)", adjustments.len());
            },
            StockDeductionResult::AlreadyApplied(_) => {
                debug!("📦 Stock for order #{order_id} was already deducted");
            },
            StockDeductionResult::NotScheduled(_) => {
                warn!("📦 No stock deduction is scheduled for order #{order_id}");
            },
        }
        Ok(result)
    }

    /// Applies up to `limit` outstanding deductions, oldest first. Failures are logged and skipped so that one bad
    /// order does not hold up the rest. Returns the number of deductions applied.
    pub async fn process_pending(&self, limit: i64) -> Result<usize, StockError> {
        let pending = self.db.pending_stock_deductions(limit).await?;
        let mut applied = 0;
        for order_id in pending {
            match self.deduct(order_id).await {
                Ok(StockDeductionResult::Applied { .. }) => applied += 1,
                Ok(_) => {},
                Err(e) => error!("📦 Could not deduct stock for order #{order_id}: {e}"),
            }
        }
        if applied > 0 {
            info!("📦 Stock sweep applied {applied} outstanding deductions");
        }
        Ok(applied)
    }
}
