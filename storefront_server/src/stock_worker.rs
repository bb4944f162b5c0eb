use std::time::Duration;

use log::*;
use storefront_engine::{SqliteDatabase, StockApi};
use tokio::task::JoinHandle;

/// The most deductions a single sweep will apply. Anything left over is picked up on the next tick.
const SWEEP_BATCH_SIZE: i64 = 100;

/// Starts the stock worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// Stock is normally deducted by the order-created event hook moments after checkout. The worker sweeps up any
/// deductions that the hook missed, e.g. because the server stopped before the event was handled.
pub fn start_stock_worker(api: StockApi<SqliteDatabase>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("📦 Stock worker started. Sweeping every {}s", interval.as_secs());
        loop {
            timer.tick().await;
            trace!("📦 Running stock deduction sweep");
            match api.process_pending(SWEEP_BATCH_SIZE).await {
                Ok(0) => trace!("📦 No outstanding stock deductions"),
                Ok(n) => info!("📦 Stock sweep applied {n} outstanding deductions"),
                Err(e) => error!("📦 Error running the stock deduction sweep: {e}"),
            }
        }
    })
}
