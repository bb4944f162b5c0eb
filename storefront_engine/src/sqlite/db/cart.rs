use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{CartItem, CartLineRow};

/// Inserts a cart line, or adds `quantity` to the existing line for the same product.
///
/// Returns `None` if the product does not exist, or if the accumulated quantity would not fit in an `i64`. In the
/// latter case the existing line is left unchanged.
pub async fn upsert_cart_item(
    user_id: i64,
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartItem>, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
            SELECT $1, id, $3 FROM products WHERE id = $2
        ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = cart_items.quantity + excluded.quantity
            WHERE cart_items.quantity <= 9223372036854775807 - excluded.quantity
        RETURNING id, user_id, product_id, quantity, created_at
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(conn)
    .await?;
    trace!("🛒️ Upserted cart item: {item:?}");
    Ok(item)
}

/// The quantity of the product in the user's cart, if there is a line for it.
pub async fn fetch_cart_quantity(
    user_id: i64,
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, sqlx::Error> {
    let quantity = sqlx::query_scalar("SELECT quantity FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(quantity)
}

/// The cart lines joined with their products. Line totals are priced by the caller.
pub async fn fetch_cart_lines(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartLineRow>, sqlx::Error> {
    let lines = sqlx::query_as(
        r#"
        SELECT
            c.id,
            c.product_id,
            p.name AS product_name,
            p.price AS unit_price,
            c.quantity
        FROM cart_items c JOIN products p ON p.id = c.product_id
        WHERE c.user_id = $1
        ORDER BY c.id
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(lines)
}

/// Sets the quantity of one of the user's cart lines. Returns `None` if the line does not belong to the user.
pub async fn update_cart_item_quantity(
    user_id: i64,
    item_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartItem>, sqlx::Error> {
    let item = sqlx::query_as(
        "UPDATE cart_items SET quantity = $1 WHERE id = $2 AND user_id = $3 RETURNING id, user_id, product_id, \
         quantity, created_at",
    )
    .bind(quantity)
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(conn)
    .await?;
    Ok(item)
}

/// Deletes one of the user's cart lines. Returns `false` if the line does not belong to the user.
pub async fn delete_cart_item(user_id: i64, item_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(item_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes every cart line for the user and returns them, oldest first.
pub async fn take_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    let mut items: Vec<CartItem> = sqlx::query_as(
        "DELETE FROM cart_items WHERE user_id = $1 RETURNING id, user_id, product_id, quantity, created_at",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    items.sort_by_key(|i| i.id);
    Ok(items)
}
