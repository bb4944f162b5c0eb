use mockall::mock;
use payfast_tools::PayfastApiError;
use storefront_engine::{
    db_types::{
        CartItem,
        CartLine,
        NewProduct,
        Order,
        OrderItem,
        OrderStatusType,
        PaymentDetails,
        Product,
        ProductUpdate,
        ShippingAddress,
    },
    traits::{
        CartError,
        CartManagement,
        CatalogError,
        CatalogManagement,
        NotificationValidator,
        OrderManagement,
        OrderManagementError,
    },
};

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;
        async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogError>;
        async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Option<Product>, CatalogError>;
    }
}

mock! {
    pub CartManager {}
    impl CartManagement for CartManager {
        async fn add_to_cart(&self, user_id: i64, product_id: i64, quantity: i64) -> Result<CartItem, CartError>;
        async fn fetch_cart(&self, user_id: i64) -> Result<Vec<CartLine>, CartError>;
        async fn remove_cart_item(&self, user_id: i64, item_id: i64) -> Result<(), CartError>;
        async fn set_cart_item_quantity(&self, user_id: i64, item_id: i64, quantity: i64) -> Result<CartItem, CartError>;
    }
}

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn checkout(&self, user_id: i64, shipping_address: ShippingAddress, payment_method: &str) -> Result<(Order, Vec<OrderItem>), OrderManagementError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError>;
        async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderManagementError>;
        async fn attach_payment_details(&self, order_id: i64, details: PaymentDetails) -> Result<Option<Order>, OrderManagementError>;
        async fn transition_order_status(&self, order_id: i64, new_status: OrderStatusType) -> Result<Option<Order>, OrderManagementError>;
    }
}

mock! {
    pub Validator {}
    impl NotificationValidator for Validator {
        async fn validate_notification(&self, raw_body: &[u8]) -> Result<bool, PayfastApiError>;
    }
}
