use sqlx::SqliteConnection;

pub async fn schedule_stock_deduction(order_id: i64, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO stock_deductions (order_id) VALUES ($1) ON CONFLICT (order_id) DO NOTHING")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Claims the deduction for the order. Returns `false` if it was already processed or was never scheduled.
pub async fn mark_deduction_processed(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE stock_deductions SET processed_at = CURRENT_TIMESTAMP WHERE order_id = $1 AND processed_at IS NULL",
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn deduction_exists(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_deductions WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

pub async fn fetch_pending_deductions(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<i64>, sqlx::Error> {
    let ids = sqlx::query_scalar(
        "SELECT order_id FROM stock_deductions WHERE processed_at IS NULL ORDER BY created_at, order_id LIMIT $1",
    )
    .bind(limit)
    .fetch_all(conn)
    .await?;
    Ok(ids)
}
