use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{CartItem, CartLine, Cents},
    traits::CartError,
    CartApi,
};

use super::{
    helpers::{expired_token, get_request, post_request, send, user_token, USER_ID},
    mocks::MockCartManager,
};
use crate::routes::{AddToCartRoute, MyCartRoute, RemoveCartItemRoute, UpdateCartItemRoute};

fn configure(manager: MockCartManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(AddToCartRoute::<MockCartManager>::new())
            .service(MyCartRoute::<MockCartManager>::new())
            .service(UpdateCartItemRoute::<MockCartManager>::new())
            .service(RemoveCartItemRoute::<MockCartManager>::new())
            .app_data(web::Data::new(CartApi::new(manager)));
    }
}

fn cart_item(id: i64, product_id: i64, quantity: i64) -> CartItem {
    CartItem {
        id,
        user_id: USER_ID,
        product_id,
        quantity,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn cart_line(id: i64, product_id: i64, price: i64, quantity: i64) -> CartLine {
    CartLine {
        id,
        product_id,
        product_name: format!("Product {product_id}"),
        unit_price: Cents::from(price),
        quantity,
        line_total: Cents::from(price * quantity),
    }
}

#[actix_web::test]
async fn cart_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_fetch_cart().never();
    let (status, body) = get_request("", "/cart", configure(manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("No bearer token was provided"), "was: {body}");
}

#[actix_web::test]
async fn expired_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_fetch_cart().never();
    let (status, _) = get_request(&expired_token(), "/cart", configure(manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn tampered_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_fetch_cart().never();
    let mut token = user_token();
    token.replace_range(token.len() - 10..token.len() - 5, "AAAAA");
    let (status, _) = get_request(&token, "/cart", configure(manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn fetch_my_cart() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager
        .expect_fetch_cart()
        .withf(|user_id| *user_id == USER_ID)
        .times(1)
        .returning(|_| Ok(vec![cart_line(1, 10, 2500, 2), cart_line(2, 11, 999, 1)]));
    let (status, body) = get_request(&user_token(), "/cart", configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let cart: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(cart["total"], "59.99");
}

#[actix_web::test]
async fn add_to_cart() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager
        .expect_add_to_cart()
        .withf(|user_id, product_id, quantity| *user_id == USER_ID && *product_id == 10 && *quantity == 2)
        .times(1)
        .returning(|_, product_id, quantity| Ok(cart_item(1, product_id, quantity)));
    let body = json!({"product_id": 10, "quantity": 2});
    let (status, body) = post_request(&user_token(), "/cart/add", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::CREATED);
    let item: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(item["quantity"], 2);
}

#[actix_web::test]
async fn add_zero_items() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_add_to_cart().never();
    let body = json!({"product_id": 10, "quantity": 0});
    let (status, _) = post_request(&user_token(), "/cart/add", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn add_unknown_product() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_add_to_cart().returning(|_, id, _| Err(CartError::ProductNotFound(id)));
    let body = json!({"product_id": 10, "quantity": 1});
    let (status, _) = post_request(&user_token(), "/cart/add", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn add_more_than_stock() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_add_to_cart().returning(|_, product_id, requested| {
        Err(CartError::InsufficientStock { product_id, requested, available: 1 })
    });
    let body = json!({"product_id": 10, "quantity": 5});
    let (status, body) = post_request(&user_token(), "/cart/add", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("only 1 available"), "was: {body}");
}

#[actix_web::test]
async fn malformed_body() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_add_to_cart().never();
    let body = json!({"product": "widget"});
    let (status, body) = post_request(&user_token(), "/cart/add", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert!(err["error"].as_str().unwrap().starts_with("Could not read request body"), "was: {body}");
}

#[actix_web::test]
async fn malformed_item_id() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_set_cart_item_quantity().never();
    let req = TestRequest::put().uri("/cart/four").set_json(json!({"quantity": 3}));
    let (status, body) = send(req, &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let err: Value = serde_json::from_str(&body).unwrap();
    assert!(err["error"].as_str().unwrap().starts_with("Could not read request path"), "was: {body}");
}

#[actix_web::test]
async fn cart_total_too_large() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_fetch_cart().returning(|_| {
        let mut big = cart_line(1, 10, 1, 1);
        big.line_total = Cents::from(i64::MAX);
        Ok(vec![big, cart_line(2, 11, 999, 1)])
    });
    let (status, body) = get_request(&user_token(), "/cart", configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("too large"), "was: {body}");
}

#[actix_web::test]
async fn add_with_unrepresentable_amount() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_add_to_cart().returning(|_, product_id, quantity| {
        Err(CartError::AmountTooLarge(format!("{quantity} of product {product_id}")))
    });
    let body = json!({"product_id": 10, "quantity": 100_000_000_000_000_000i64});
    let (status, _) = post_request(&user_token(), "/cart/add", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn set_quantity() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager
        .expect_set_cart_item_quantity()
        .withf(|user_id, item_id, quantity| *user_id == USER_ID && *item_id == 4 && *quantity == 3)
        .times(1)
        .returning(|_, item_id, quantity| Ok(cart_item(item_id, 10, quantity)));
    let req = TestRequest::put().uri("/cart/4").set_json(json!({"quantity": 3}));
    let (status, body) = send(req, &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let item: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(item["quantity"], 3);
}

#[actix_web::test]
async fn set_quantity_of_someone_elses_item() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_set_cart_item_quantity().returning(|_, item_id, _| Err(CartError::CartItemNotFound(item_id)));
    let req = TestRequest::put().uri("/cart/4").set_json(json!({"quantity": 3}));
    let (status, _) = send(req, &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn remove_item() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager
        .expect_remove_cart_item()
        .withf(|user_id, item_id| *user_id == USER_ID && *item_id == 4)
        .times(1)
        .returning(|_, _| Ok(()));
    let (status, body) = send(TestRequest::delete().uri("/cart/4"), &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[actix_web::test]
async fn remove_missing_item() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCartManager::new();
    manager.expect_remove_cart_item().returning(|_, item_id| Err(CartError::CartItemNotFound(item_id)));
    let (status, _) = send(TestRequest::delete().uri("/cart/4"), &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
