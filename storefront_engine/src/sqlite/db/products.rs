use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{NewProduct, Product, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, image_url, created_at, updated_at";

pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

pub async fn fetch_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products =
        sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id")).fetch_all(conn).await?;
    Ok(products)
}

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product: Product = sqlx::query_as(&format!(
        "INSERT INTO products (name, description, price, stock, image_url) VALUES ($1, $2, $3, $4, $5) RETURNING \
         {PRODUCT_COLUMNS}"
    ))
    .bind(product.name)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(product.image_url)
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product #{} [{}] inserted", product.id, product.name);
    Ok(product)
}

pub async fn update_product(
    product_id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for product {product_id}. Update request skipped.");
        return fetch_product(product_id, conn).await;
    }
    let mut builder = QueryBuilder::new("UPDATE products SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    set_clause.push("updated_at = CURRENT_TIMESTAMP");
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(format!(" RETURNING {PRODUCT_COLUMNS}"));
    trace!("🗃️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    Ok(product)
}

/// Decrements the product's stock by at most `quantity`, never below zero. Returns the quantity actually deducted,
/// or `None` if the product does not exist.
pub async fn deduct_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, sqlx::Error> {
    let stock: Option<i64> =
        sqlx::query_scalar("SELECT stock FROM products WHERE id = $1").bind(product_id).fetch_optional(&mut *conn).await?;
    let Some(stock) = stock else {
        return Ok(None);
    };
    let deducted = quantity.min(stock).max(0);
    if deducted > 0 {
        sqlx::query(
            "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND stock >= $1",
        )
        .bind(deducted)
        .bind(product_id)
        .execute(conn)
        .await?;
    }
    Ok(Some(deducted))
}
