use log::{debug, trace};
use sqlx::{types::Json, SqliteConnection};

use crate::db_types::{Cents, Order, OrderItem, OrderRow, OrderStatusType, PaymentDetails, ShippingAddress};

const ORDER_COLUMNS: &str =
    "id, user_id, total_amount, status, shipping_address, payment_details, created_at, updated_at";

/// A line that is about to become an order item.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: Cents,
}

/// Inserts a new pending order. This is not atomic. Embed the call in a transaction together with the order items.
pub async fn insert_order(
    user_id: i64,
    total_amount: Cents,
    shipping_address: ShippingAddress,
    payment_details: PaymentDetails,
    conn: &mut SqliteConnection,
) -> Result<Order, sqlx::Error> {
    let row: OrderRow = sqlx::query_as(&format!(
        "INSERT INTO orders (user_id, total_amount, status, shipping_address, payment_details) VALUES ($1, $2, $3, \
         $4, $5) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(total_amount)
    .bind(OrderStatusType::Pending)
    .bind(Json(shipping_address))
    .bind(Json(payment_details))
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Order #{} inserted for user {user_id}. Total {total_amount}", row.id);
    Ok(row.into())
}

pub async fn insert_order_items(
    order_id: i64,
    items: &[NewOrderItem],
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, sqlx::Error> {
    let mut result = Vec::with_capacity(items.len());
    for item in items {
        let item: OrderItem = sqlx::query_as(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4) RETURNING id, \
             order_id, product_id, quantity, price",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .fetch_one(&mut *conn)
        .await?;
        result.push(item);
    }
    trace!("🗃️ {} items inserted for order #{order_id}", result.len());
    Ok(result)
}

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(order_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(Order::from))
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT id, order_id, product_id, quantity, price FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// The user's orders, newest first.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let rows: Vec<OrderRow> =
        sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY id DESC"))
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(rows.into_iter().map(Order::from).collect())
}

/// Replaces the payment details of the order, provided that it is still pending.
pub async fn update_payment_details(
    order_id: i64,
    details: PaymentDetails,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "UPDATE orders SET payment_details = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(Json(details))
    .bind(order_id)
    .bind(OrderStatusType::Pending)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Order::from))
}

/// Sets the order status, provided that the order is currently pending. Returns `None` if nothing changed.
pub async fn update_pending_order_status(
    order_id: i64,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> = sqlx::query_as(&format!(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING \
         {ORDER_COLUMNS}"
    ))
    .bind(status)
    .bind(order_id)
    .bind(OrderStatusType::Pending)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(Order::from))
}

/// The product price, and its stock less the quantities held by orders whose stock deduction is still outstanding.
/// Returns `None` if the product does not exist.
pub async fn fetch_price_and_availability(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<(Cents, i64)>, sqlx::Error> {
    let row: Option<(Cents, i64, i64)> = sqlx::query_as(
        r#"
        SELECT p.price, p.stock, COALESCE((
            SELECT SUM(oi.quantity) FROM order_items oi
            JOIN stock_deductions sd ON sd.order_id = oi.order_id
            WHERE sd.processed_at IS NULL AND oi.product_id = p.id
        ), 0) AS reserved
        FROM products p WHERE p.id = $1
        "#,
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(row.map(|(price, stock, reserved)| (price, (stock - reserved).max(0))))
}
