use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use storefront_engine::{
    db_types::{Cents, Order, OrderItem, OrderStatusType, PaymentDetails, ShippingAddress},
    events::EventProducers,
    test_utils::notifications::test_payfast_config,
    traits::OrderManagementError,
    OrderFlowApi,
    PaymentGatewayAdapter,
};

use super::{
    helpers::{get_request, post_request, send, user_token, USER_ID},
    mocks::{MockOrderManager, MockValidator},
};
use crate::routes::{CheckoutRoute, MyOrderRoute, MyOrdersRoute, RequestPaymentRoute};

fn configure(manager: MockOrderManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let gateway = PaymentGatewayAdapter::new(test_payfast_config(), MockValidator::new());
        let api = OrderFlowApi::new(manager, gateway, EventProducers::default());
        cfg.service(CheckoutRoute::<MockOrderManager, MockValidator>::new())
            .service(MyOrdersRoute::<MockOrderManager, MockValidator>::new())
            .service(MyOrderRoute::<MockOrderManager, MockValidator>::new())
            .service(RequestPaymentRoute::<MockOrderManager, MockValidator>::new())
            .app_data(web::Data::new(api));
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        street: "3 Kloof Street".into(),
        city: "Cape Town".into(),
        state: "Western Cape".into(),
        country: "ZA".into(),
        postal_code: "8001".into(),
    }
}

fn order(id: i64, user_id: i64, status: OrderStatusType) -> Order {
    Order {
        id,
        user_id,
        total_amount: Cents::from(5999),
        status,
        shipping_address: address(),
        payment_details: PaymentDetails::unrequested("payfast"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn items(order_id: i64) -> Vec<OrderItem> {
    vec![
        OrderItem { id: 1, order_id, product_id: 10, quantity: 2, price: Cents::from(2500) },
        OrderItem { id: 2, order_id, product_id: 11, quantity: 1, price: Cents::from(999) },
    ]
}

fn checkout_body() -> Value {
    json!({"shipping_address": address(), "payment_method": "payfast"})
}

#[actix_web::test]
async fn checkout_returns_order_with_payment_request() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager
        .expect_checkout()
        .withf(|user_id, _, method| *user_id == USER_ID && method.to_string() == "payfast")
        .times(1)
        .returning(|user_id, _, _| Ok((order(31, user_id, OrderStatusType::Pending), items(31))));
    manager.expect_attach_payment_details().times(1).returning(|id, details| {
        let mut order = order(id, USER_ID, OrderStatusType::Pending);
        order.payment_details = details;
        Ok(Some(order))
    });
    let (status, body) = post_request(&user_token(), "/checkout", &checkout_body(), configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["id"], 31);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], "59.99");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);
    assert_eq!(order["payment_details"]["payment_url"], "https://sandbox.payfast.co.za/eng/process");
    assert_eq!(order["payment_details"]["payment_data"]["m_payment_id"], "31");
    assert!(order["payment_details"]["payment_data"]["signature"].is_string());
}

#[actix_web::test]
async fn checkout_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_checkout().never();
    let (status, _) = post_request("", "/checkout", &checkout_body(), configure(manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn checkout_empty_cart() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_checkout().returning(|_, _, _| Err(OrderManagementError::EmptyCart));
    let (status, body) = post_request(&user_token(), "/checkout", &checkout_body(), configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"The cart is empty"}"#);
}

#[actix_web::test]
async fn checkout_insufficient_stock() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_checkout().returning(|_, _, _| {
        Err(OrderManagementError::InsufficientStock { product_id: 10, requested: 3, available: 1 })
    });
    let (status, body) = post_request(&user_token(), "/checkout", &checkout_body(), configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Insufficient stock for product 10"), "was: {body}");
}

#[actix_web::test]
async fn checkout_with_incomplete_address() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_checkout().never();
    let mut address = address();
    address.postal_code = String::default();
    let body = json!({"shipping_address": address, "payment_method": "payfast"});
    let (status, body) = post_request(&user_token(), "/checkout", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("postal_code"), "was: {body}");
}

#[actix_web::test]
async fn list_my_orders() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager
        .expect_fetch_orders_for_user()
        .withf(|user_id| *user_id == USER_ID)
        .returning(|user_id| Ok(vec![order(32, user_id, OrderStatusType::Pending), order(31, user_id, OrderStatusType::Completed)]));
    manager.expect_fetch_order_items().times(2).returning(|id| Ok(items(id)));
    let (status, body) = get_request(&user_token(), "/orders", configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Value = serde_json::from_str(&body).unwrap();
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], 32);
    assert_eq!(orders[1]["status"], "completed");
}

#[actix_web::test]
async fn fetch_my_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, USER_ID, OrderStatusType::Pending))));
    manager.expect_fetch_order_items().returning(|id| Ok(items(id)));
    let (status, body) = get_request(&user_token(), "/orders/31", configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["id"], 31);
}

#[actix_web::test]
async fn other_users_orders_are_not_found() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, USER_ID + 1, OrderStatusType::Pending))));
    manager.expect_fetch_order_items().never();
    let (status, _) = get_request(&user_token(), "/orders/31", configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn request_payment_for_pending_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, USER_ID, OrderStatusType::Pending))));
    manager.expect_attach_payment_details().times(1).returning(|id, details| {
        let mut order = order(id, USER_ID, OrderStatusType::Pending);
        order.payment_details = details;
        Ok(Some(order))
    });
    manager.expect_fetch_order_items().returning(|id| Ok(items(id)));
    let (status, body) = send(TestRequest::post().uri("/orders/31/payment"), &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["payment_details"]["payment_data"]["amount"], "59.99");
}

#[actix_web::test]
async fn request_payment_for_completed_order_conflicts() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, USER_ID, OrderStatusType::Completed))));
    manager.expect_attach_payment_details().never();
    let (status, body) = send(TestRequest::post().uri("/orders/31/payment"), &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("completed"), "was: {body}");
}

#[actix_web::test]
async fn request_payment_for_unknown_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|_| Ok(None));
    let (status, _) = send(TestRequest::post().uri("/orders/31/payment"), &user_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
