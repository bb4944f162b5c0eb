//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use storefront_engine::{
    db_types::{NewProduct, ProductUpdate},
    order_objects::CheckoutRequest,
    traits::{CartManagement, CatalogManagement, NotificationValidator, OrderManagement},
    CartApi,
    CatalogApi,
    OrderFlowApi,
    WebhookApi,
};

use crate::{
    auth::{JwtClaims, Role},
    config::ProxyConfig,
    data_objects::{AddToCartRequest, SetQuantityRequest},
    errors::{AuthError, ServerError},
    helpers::{get_remote_ip, is_whitelisted},
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),*]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(products => Get "/products" impl CatalogManagement);
pub async fn products<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET products");
    let products = api.products().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product => Get "/products/{id}" impl CatalogManagement);
pub async fn product<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET product {id}");
    let product = api.product(id).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(create_product => Post "/products" impl CatalogManagement where requires [Role::Admin]);
/// Adds a product to the catalog. Only admins may do this.
pub async fn create_product<B: CatalogManagement>(
    claims: JwtClaims,
    body: web::Json<NewProduct>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product = body.into_inner();
    debug!("💻️ POST product [{}] by {}", product.name, claims.username);
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(update_product => Patch "/products/{id}" impl CatalogManagement where requires [Role::Admin]);
/// Changes any of the name, description, price, stock or image of a product. Omitted fields are left as is.
pub async fn update_product<B: CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let update = body.into_inner();
    if update.is_empty() {
        return Err(ServerError::InvalidArgument("The update does not change anything".into()));
    }
    debug!("💻️ PATCH product {id} by {}", claims.username);
    let product = api.update_product(id, update).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(add_to_cart => Post "/cart/add" impl CartManagement where requires [Role::User]);
/// Adds a product to the authenticated user's cart. Adding a product that is already in the cart increases the
/// quantity of that line, as long as there is enough stock for the new quantity.
pub async fn add_to_cart<B: CartManagement>(
    claims: JwtClaims,
    body: web::Json<AddToCartRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer = claims.to_customer()?;
    let AddToCartRequest { product_id, quantity } = body.into_inner();
    debug!("💻️ POST cart/add {quantity} of {product_id} for {}", customer.username);
    let item = api.add(&customer, product_id, quantity).await?;
    Ok(HttpResponse::Created().json(item))
}

route!(my_cart => Get "/cart" impl CartManagement where requires [Role::User]);
pub async fn my_cart<B: CartManagement>(
    claims: JwtClaims,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer = claims.to_customer()?;
    trace!("💻️ GET cart for {}", customer.username);
    let cart = api.list(&customer).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(update_cart_item => Put "/cart/{id}" impl CartManagement where requires [Role::User]);
pub async fn update_cart_item<B: CartManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<SetQuantityRequest>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer = claims.to_customer()?;
    let item_id = path.into_inner();
    let quantity = body.into_inner().quantity;
    debug!("💻️ PUT cart item {item_id} to {quantity} for {}", customer.username);
    let item = api.set_quantity(&customer, item_id, quantity).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(remove_cart_item => Delete "/cart/{id}" impl CartManagement where requires [Role::User]);
pub async fn remove_cart_item<B: CartManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<CartApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let customer = claims.to_customer()?;
    let item_id = path.into_inner();
    debug!("💻️ DELETE cart item {item_id} for {}", customer.username);
    api.remove(&customer, item_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl OrderManagement, NotificationValidator where requires [Role::User]);
/// Converts the authenticated user's cart into a pending order and returns the order, including the signed payment
/// request the client should post to the payment gateway.
///
/// Stock is reserved immediately, but the product stock levels are only decremented shortly afterwards.
pub async fn checkout<B, V>(
    claims: JwtClaims,
    body: web::Json<CheckoutRequest>,
    api: web::Data<OrderFlowApi<B, V>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    V: NotificationValidator,
{
    let customer = claims.to_customer()?;
    let CheckoutRequest { shipping_address, payment_method } = body.into_inner();
    debug!("💻️ POST checkout for {}", customer.username);
    let order = api.checkout(&customer, shipping_address, &payment_method).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl OrderManagement, NotificationValidator where requires [Role::User]);
pub async fn my_orders<B, V>(
    claims: JwtClaims,
    api: web::Data<OrderFlowApi<B, V>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    V: NotificationValidator,
{
    let customer = claims.to_customer()?;
    trace!("💻️ GET orders for {}", customer.username);
    let orders = api.orders_for_customer(&customer).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(my_order => Get "/orders/{id}" impl OrderManagement, NotificationValidator where requires [Role::User]);
/// Fetches one of the authenticated user's orders. Other users' orders are reported as not found.
pub async fn my_order<B, V>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, V>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    V: NotificationValidator,
{
    let customer = claims.to_customer()?;
    let order_id = path.into_inner();
    trace!("💻️ GET order {order_id} for {}", customer.username);
    let order = api.order_for_customer(&customer, order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(request_payment => Post "/orders/{id}/payment" impl OrderManagement, NotificationValidator where requires [Role::User]);
/// (Re)builds the signed payment request for a pending order. Orders that are no longer pending get a 409.
pub async fn request_payment<B, V>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, V>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    V: NotificationValidator,
{
    let customer = claims.to_customer()?;
    let order_id = path.into_inner();
    debug!("💻️ POST payment request for order {order_id} by {}", customer.username);
    let order = api.request_payment(&customer, order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Webhooks  ----------------------------------------------------
route!(payment_notification => Post "/webhook/payment" impl OrderManagement, NotificationValidator);
/// Receives instant transaction notifications from the payment gateway.
///
/// The body is read raw, since the gateway validates the exact bytes it sent. If a whitelist is configured, requests
/// from other addresses are refused before the body is looked at.
///
/// Notifications that are authentic but change nothing (duplicates, unknown orders, informational statuses) still get
/// a 200, so that the gateway stops redelivering them.
pub async fn payment_notification<B, V>(
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<ProxyConfig>,
    api: web::Data<WebhookApi<B, V>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    V: NotificationValidator,
{
    trace!("💻️ Received payment notification");
    let peer_addr = get_remote_ip(&req, config.use_x_forwarded_for, config.use_forwarded);
    if !is_whitelisted(config.payfast_whitelist.as_deref(), peer_addr) {
        warn!("💻️ Payment notification from {peer_addr:?} is not from a whitelisted address. The request is rejected.");
        return Err(ServerError::AuthenticationError(AuthError::ForbiddenPeer));
    }
    info!("💻️ Payment notification received from {peer_addr:?}");
    let outcome = api.process_notification(body.as_ref()).await.map_err(|e| {
        warn!("💻️ Payment notification from {peer_addr:?} was not processed. {e}");
        ServerError::from(e)
    })?;
    debug!("💻️ Payment notification outcome: {outcome:?}");
    Ok(HttpResponse::Ok().json(outcome))
}
