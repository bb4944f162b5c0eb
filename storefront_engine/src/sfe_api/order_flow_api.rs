use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Customer, Order, OrderDetails, OrderStatusType, ShippingAddress},
    events::{EventProducers, OrderCreatedEvent},
    sfe_api::{errors::OrderFlowError, payment_gateway::PaymentGatewayAdapter},
    traits::OrderManagement,
};

/// `OrderFlowApi` turns carts into orders and hands them off to the payment gateway.
pub struct OrderFlowApi<B, V> {
    db: B,
    gateway: PaymentGatewayAdapter<V>,
    producers: EventProducers,
}

impl<B, V> Debug for OrderFlowApi<B, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, V> OrderFlowApi<B, V> {
    pub fn new(db: B, gateway: PaymentGatewayAdapter<V>, producers: EventProducers) -> Self {
        Self { db, gateway, producers }
    }
}

impl<B, V> OrderFlowApi<B, V>
where B: OrderManagement
{
    /// Converts the customer's cart into a pending order.
    ///
    /// The order, its items, the scheduled stock deduction and the emptied cart are committed together by the
    /// backend. After that:
    /// * A signed payment request is attached to the order. If that fails, the order is still returned, pending and
    ///   without payment details. [`Self::request_payment`] can be called to try again.
    /// * An [`OrderCreatedEvent`] is published, which triggers the stock deduction. Stock is therefore not guaranteed
    ///   to be decremented by the time this method returns.
    pub async fn checkout(
        &self,
        customer: &Customer,
        shipping_address: ShippingAddress,
        payment_method: &str,
    ) -> Result<OrderDetails, OrderFlowError> {
        let missing = shipping_address.missing_fields();
        if !missing.is_empty() {
            return Err(OrderFlowError::InvalidRequest(format!("missing address fields: {}", missing.join(", "))));
        }
        if payment_method.trim().is_empty() {
            return Err(OrderFlowError::InvalidRequest("a payment method is required".into()));
        }
        let (order, items) = self.db.checkout(customer.id, shipping_address, payment_method.trim()).await?;
        info!("🔄️🛒️ {} checked out order #{} for {}", customer.username, order.id, order.total_amount);
        let order = match self.attach_payment_request(&order, customer).await {
            Ok(order) => order,
            Err(e) => {
                error!(
                    "🔄️💳️ Order #{} was created, but the payment request could not be attached: {e}. The order \
                     remains pending without payment details.",
                    order.id
                );
                order
            },
        };
        self.producers.publish_order_created(OrderCreatedEvent::new(order.clone(), items.clone())).await;
        Ok(OrderDetails::new(order, items))
    }

    /// (Re)builds the payment request for one of the customer's pending orders. The order itself is not recreated.
    pub async fn request_payment(&self, customer: &Customer, order_id: i64) -> Result<OrderDetails, OrderFlowError> {
        let order = self.fetch_customer_order(customer, order_id).await?;
        if order.status != OrderStatusType::Pending {
            return Err(OrderFlowError::OrderNotPayable { order_id, status: order.status });
        }
        let order = self.attach_payment_request(&order, customer).await?;
        let items = self.db.fetch_order_items(order_id).await?;
        Ok(OrderDetails::new(order, items))
    }

    pub async fn orders_for_customer(&self, customer: &Customer) -> Result<Vec<OrderDetails>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(customer.id).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.fetch_order_items(order.id).await?;
            result.push(OrderDetails::new(order, items));
        }
        Ok(result)
    }

    /// Fetches one of the customer's orders. Orders belonging to anyone else are reported as not found.
    pub async fn order_for_customer(&self, customer: &Customer, order_id: i64) -> Result<OrderDetails, OrderFlowError> {
        let order = self.fetch_customer_order(customer, order_id).await?;
        let items = self.db.fetch_order_items(order_id).await?;
        Ok(OrderDetails::new(order, items))
    }

    async fn fetch_customer_order(&self, customer: &Customer, order_id: i64) -> Result<Order, OrderFlowError> {
        self.db
            .fetch_order(order_id)
            .await?
            .filter(|o| o.user_id == customer.id)
            .ok_or(OrderFlowError::OrderNotFound(order_id))
    }

    async fn attach_payment_request(&self, order: &Order, customer: &Customer) -> Result<Order, OrderFlowError> {
        let details = self
            .gateway
            .build_payment_request(order, customer)
            .map_err(|e| OrderFlowError::PaymentRequestError(e.to_string()))?;
        let updated = self.db.attach_payment_details(order.id, details).await?;
        match updated {
            Some(order) => {
                debug!("🔄️💳️ Payment request attached to order #{}", order.id);
                Ok(order)
            },
            None => {
                let status = self.db.fetch_order(order.id).await?.map(|o| o.status).unwrap_or(order.status);
                Err(OrderFlowError::OrderNotPayable { order_id: order.id, status })
            },
        }
    }
}
