use std::{sync::Arc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use payfast_tools::PayfastApi;
use storefront_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    helpers::MemoryCatalogCache,
    traits::CatalogCache,
    CartApi,
    CatalogApi,
    OrderFlowApi,
    PaymentGatewayAdapter,
    SqliteDatabase,
    StockApi,
    WebhookApi,
};

use crate::{
    auth::JwtAuthority,
    config::{ProxyConfig, ServerConfig},
    errors::ServerError,
    routes::{
        health,
        AddToCartRoute,
        CheckoutRoute,
        CreateProductRoute,
        MyCartRoute,
        MyOrderRoute,
        MyOrdersRoute,
        PaymentNotificationRoute,
        ProductRoute,
        ProductsRoute,
        RemoveCartItemRoute,
        RequestPaymentRoute,
        UpdateCartItemRoute,
        UpdateProductRoute,
    },
    stock_worker::start_stock_worker,
};

const EVENT_BUFFER_SIZE: usize = 128;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Could not run migrations. {e}")))?;
    let cache: Arc<dyn CatalogCache> = Arc::new(MemoryCatalogCache::new(config.catalog_cache_ttl));
    let validator = PayfastApi::new(config.payfast.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hooks = create_event_hooks(StockApi::new(db.clone(), Arc::clone(&cache)));
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let _worker = start_stock_worker(StockApi::new(db.clone(), Arc::clone(&cache)), config.stock_sweep_interval);
    let srv = create_server_instance(config, db, cache, validator, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Stock is deducted as soon as an order is created. Status changes are only logged.
pub fn create_event_hooks(stock_api: StockApi<SqliteDatabase>) -> EventHooks {
    let stock_api = Arc::new(stock_api);
    let mut hooks = EventHooks::default();
    hooks.on_order_created(move |ev| {
        let api = Arc::clone(&stock_api);
        Box::pin(async move {
            let order_id = ev.order.id;
            if let Err(e) = api.deduct(order_id).await {
                warn!("📦 Could not deduct stock for order #{order_id}. The stock worker will retry. {e}");
            }
        })
    });
    hooks.on_order_status_changed(|ev| {
        Box::pin(async move {
            info!("🔄️ Order #{} moved from {} to {}", ev.order.id, ev.old_status, ev.new_status());
        })
    });
    hooks
}

/// Malformed JSON bodies and path segments are reported with the same `{"error": ...}` body as every other failure.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default().error_handler(|e, _req| ServerError::InvalidRequestBody(e.to_string()).into()),
    )
    .app_data(web::PathConfig::default().error_handler(|e, _req| ServerError::InvalidRequestPath(e.to_string()).into()));
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    cache: Arc<dyn CatalogCache>,
    validator: PayfastApi,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let proxy_config = ProxyConfig::from_config(&config);
    let authority = JwtAuthority::new(&config.auth);
    let gateway = PaymentGatewayAdapter::new(config.payfast.clone(), validator);
    let srv = HttpServer::new(move || {
        let catalog_api = CatalogApi::new(db.clone(), Arc::clone(&cache));
        let cart_api = CartApi::new(db.clone());
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone(), producers.clone());
        let webhook_api = WebhookApi::new(db.clone(), gateway.clone(), producers.clone());
        let api_scope = web::scope("/api")
            .service(ProductsRoute::<SqliteDatabase>::new())
            .service(ProductRoute::<SqliteDatabase>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(AddToCartRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(UpdateCartItemRoute::<SqliteDatabase>::new())
            .service(RemoveCartItemRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase, PayfastApi>::new())
            .service(MyOrdersRoute::<SqliteDatabase, PayfastApi>::new())
            .service(MyOrderRoute::<SqliteDatabase, PayfastApi>::new())
            .service(RequestPaymentRoute::<SqliteDatabase, PayfastApi>::new())
            .service(PaymentNotificationRoute::<SqliteDatabase, PayfastApi>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sf::access_log"))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(webhook_api))
            .app_data(web::Data::new(authority.clone()))
            .app_data(web::Data::new(proxy_config.clone()))
            .configure(configure_extractors)
            .service(health)
            .service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
