use std::{sync::Arc, time::Duration};

use actix_web::{
    http::StatusCode,
    test::TestRequest,
    web,
    web::ServiceConfig,
};
use serde_json::{json, Value};
use storefront_engine::{helpers::MemoryCatalogCache, traits::CatalogError, CatalogApi};

use super::{
    helpers::{admin_token, get_request, post_request, product, send, user_token},
    mocks::MockCatalogManager,
};
use crate::routes::{CreateProductRoute, ProductRoute, ProductsRoute, UpdateProductRoute};

fn configure(manager: MockCatalogManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CatalogApi::new(manager, Arc::new(MemoryCatalogCache::new(Duration::from_secs(60))));
        cfg.service(ProductsRoute::<MockCatalogManager>::new())
            .service(ProductRoute::<MockCatalogManager>::new())
            .service(CreateProductRoute::<MockCatalogManager>::new())
            .service(UpdateProductRoute::<MockCatalogManager>::new())
            .app_data(web::Data::new(api));
    }
}

#[actix_web::test]
async fn anyone_can_list_products() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_fetch_products().returning(|| Ok(vec![product(1, "Widget", 2500, 3), product(2, "Gadget", 999, 0)]));
    let (status, body) = get_request("", "/products", configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let products: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(products.as_array().unwrap().len(), 2);
    assert_eq!(products[0]["name"], "Widget");
    assert_eq!(products[0]["price"], "25.00");
    assert_eq!(products[1]["price"], "9.99");
}

#[actix_web::test]
async fn fetch_single_product() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_fetch_product().times(1).returning(|id| Ok(Some(product(id, "Widget", 2500, 3))));
    let (status, body) = get_request("", "/products/4", configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["id"], 4);
    assert_eq!(product["stock"], 3);
}

#[actix_web::test]
async fn missing_product_is_404() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_fetch_product().returning(|_| Ok(None));
    let (status, body) = get_request("", "/products/99", configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Product 99 does not exist"}"#);
}

#[actix_web::test]
async fn create_product_needs_a_token() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_insert_product().never();
    let body = json!({"name": "Widget", "price": "25.00", "stock": 3});
    let (status, _) = post_request("", "/products", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_product_needs_admin() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_insert_product().never();
    let body = json!({"name": "Widget", "price": "25.00", "stock": 3});
    let (status, body) = post_request(&user_token(), "/products", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("admin"), "was: {body}");
}

#[actix_web::test]
async fn admin_creates_product() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager
        .expect_insert_product()
        .times(1)
        .returning(|p| Ok(product(12, &p.name, p.price.value(), p.stock)));
    let body = json!({"name": "Widget", "price": "25.00", "stock": 3});
    let (status, body) = post_request(&admin_token(), "/products", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::CREATED);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["id"], 12);
    assert_eq!(product["price"], "25.00");
}

#[actix_web::test]
async fn products_must_have_a_positive_price() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_insert_product().never();
    let body = json!({"name": "Widget", "price": "0.00", "stock": 3});
    let (status, body) = post_request(&admin_token(), "/products", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("price must be positive"), "was: {body}");
}

#[actix_web::test]
async fn backend_errors_are_500() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_insert_product().returning(|_| Err(CatalogError::DatabaseError("disk full".into())));
    let body = json!({"name": "Widget", "price": "1.00"});
    let (status, _) = post_request(&admin_token(), "/products", &body, configure(manager)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn admin_updates_product() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager
        .expect_update_product()
        .withf(|id, update| *id == 3 && update.stock == Some(10) && update.price.is_none())
        .times(1)
        .returning(|id, _| Ok(Some(product(id, "Widget", 2500, 10))));
    let req = TestRequest::patch().uri("/products/3").set_json(json!({"stock": 10}));
    let (status, body) = send(req, &admin_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::OK);
    let product: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(product["stock"], 10);
}

#[actix_web::test]
async fn updating_missing_product_is_404() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_update_product().returning(|_, _| Ok(None));
    let req = TestRequest::patch().uri("/products/3").set_json(json!({"stock": 10}));
    let (status, _) = send(req, &admin_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn empty_updates_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut manager = MockCatalogManager::new();
    manager.expect_update_product().never();
    let req = TestRequest::patch().uri("/products/3").set_json(json!({}));
    let (status, _) = send(req, &admin_token(), configure(manager)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
