use std::net::{IpAddr, SocketAddr};

use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use payfast_tools::PayfastApiError;
use serde_json::Value;
use sf_common::Cents;
use storefront_engine::{
    db_types::{Order, OrderStatusType, PaymentDetails, ShippingAddress},
    events::EventProducers,
    test_utils::notifications::{itn_body, itn_fields, signed_itn_body, test_payfast_config},
    traits::OrderManagementError,
    PaymentGatewayAdapter,
    WebhookApi,
};

use super::{
    helpers::send,
    mocks::{MockOrderManager, MockValidator},
};
use crate::{config::ProxyConfig, routes::PaymentNotificationRoute};

const PAYFAST_IP: &str = "197.97.145.144";

fn configure(
    manager: MockOrderManager,
    validator: MockValidator,
    proxy: ProxyConfig,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let gateway = PaymentGatewayAdapter::new(test_payfast_config(), validator);
        let api = WebhookApi::new(manager, gateway, EventProducers::default());
        cfg.service(PaymentNotificationRoute::<MockOrderManager, MockValidator>::new())
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(proxy));
    }
}

fn whitelist() -> ProxyConfig {
    let ip = PAYFAST_IP.parse().unwrap();
    ProxyConfig { payfast_whitelist: Some(vec![ip]), ..ProxyConfig::default() }
}

fn order(id: i64, status: OrderStatusType) -> Order {
    Order {
        id,
        user_id: 7,
        total_amount: Cents::from(5999),
        status,
        shipping_address: ShippingAddress {
            street: "3 Kloof Street".into(),
            city: "Cape Town".into(),
            state: "Western Cape".into(),
            country: "ZA".into(),
            postal_code: "8001".into(),
        },
        payment_details: PaymentDetails::unrequested("payfast"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
    }
}

fn notification(body: String, from: &str) -> TestRequest {
    let ip: IpAddr = from.parse().unwrap();
    TestRequest::post()
        .uri("/webhook/payment")
        .peer_addr(SocketAddr::new(ip, 443))
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(body)
}

fn pending_order_manager() -> MockOrderManager {
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, OrderStatusType::Pending))));
    manager
}

fn accepting_validator() -> MockValidator {
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().times(1).returning(|_| Ok(true));
    validator
}

#[actix_web::test]
async fn complete_notification_completes_the_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = pending_order_manager();
    manager
        .expect_transition_order_status()
        .withf(|id, status| *id == 31 && *status == OrderStatusType::Completed)
        .times(1)
        .returning(|id, status| Ok(Some(order(id, status))));
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, PAYFAST_IP);
    let (status, body) = send(req, "", configure(manager, accepting_validator(), whitelist())).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["outcome"], "transitioned");
    assert_eq!(outcome["order_id"], 31);
    assert_eq!(outcome["to"], "completed");
}

#[actix_web::test]
async fn notifications_from_unlisted_peers_are_forbidden() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().never();
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().never();
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, "203.0.113.9");
    let (status, _) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn no_whitelist_accepts_any_peer() {
    let _ = env_logger::try_init().ok();
    let mut manager = pending_order_manager();
    manager.expect_transition_order_status().returning(|id, status| Ok(Some(order(id, status))));
    let body = itn_body(31, "CANCELLED", Cents::from(5999));
    let req = notification(body, "203.0.113.9");
    let (status, body) = send(req, "", configure(manager, accepting_validator(), ProxyConfig::default())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("cancelled"), "was: {body}");
}

#[actix_web::test]
async fn forwarded_address_is_checked_when_enabled() {
    let _ = env_logger::try_init().ok();
    let mut manager = pending_order_manager();
    manager.expect_transition_order_status().returning(|id, status| Ok(Some(order(id, status))));
    let proxy = ProxyConfig { use_x_forwarded_for: true, ..whitelist() };
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, "10.0.0.2").insert_header(("X-Forwarded-For", PAYFAST_IP));
    let (status, _) = send(req, "", configure(manager, accepting_validator(), proxy)).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn bad_signature_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().never();
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().never();
    let body = signed_itn_body(itn_fields("31", "COMPLETE", Cents::from(5999)), "not-the-passphrase");
    let req = notification(body, PAYFAST_IP);
    let (status, body) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("signature"), "was: {body}");
}

#[actix_web::test]
async fn altered_notifications_are_rejected_in_every_state() {
    let _ = env_logger::try_init().ok();
    for state in [OrderStatusType::Pending, OrderStatusType::Completed, OrderStatusType::Cancelled] {
        let mut manager = MockOrderManager::new();
        manager.expect_fetch_order().never().returning(move |id| Ok(Some(order(id, state))));
        manager.expect_transition_order_status().never();
        let mut validator = MockValidator::new();
        validator.expect_validate_notification().never();
        let forged = if state == OrderStatusType::Completed { "CANCELLED" } else { "COMPLETE" };
        let body = itn_body(31, "PENDING", Cents::from(5999))
            .replace("payment_status=PENDING", &format!("payment_status={forged}"));
        let req = notification(body, PAYFAST_IP);
        let (status, body) = send(req, "", configure(manager, validator, whitelist())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "order was {state}");
        assert!(body.contains("signature"), "was: {body}");
    }
}

#[actix_web::test]
async fn unconfirmed_notification_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut manager = pending_order_manager();
    manager.expect_transition_order_status().never();
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().returning(|_| Ok(false));
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, PAYFAST_IP);
    let (status, _) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn validation_timeouts_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut manager = pending_order_manager();
    manager.expect_transition_order_status().never();
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().returning(|_| Err(PayfastApiError::Timeout(10)));
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, PAYFAST_IP);
    let (status, _) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn duplicate_notification_for_final_order() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|id| Ok(Some(order(id, OrderStatusType::Completed))));
    manager.expect_transition_order_status().never();
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().never();
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, PAYFAST_IP);
    let (status, body) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["outcome"], "already_final");
}

#[actix_web::test]
async fn unknown_order_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|_| Ok(None));
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().never();
    let body = itn_body(404, "COMPLETE", Cents::from(5999));
    let req = notification(body, PAYFAST_IP);
    let (status, body) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::OK);
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["outcome"], "unknown_order");
    assert_eq!(outcome["reference"], "404");
}

#[actix_web::test]
async fn database_errors_are_500() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockOrderManager::new();
    manager.expect_fetch_order().returning(|_| Err(OrderManagementError::DatabaseError("locked".into())));
    let mut validator = MockValidator::new();
    validator.expect_validate_notification().never();
    let body = itn_body(31, "COMPLETE", Cents::from(5999));
    let req = notification(body, PAYFAST_IP);
    let (status, _) = send(req, "", configure(manager, validator, whitelist())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
