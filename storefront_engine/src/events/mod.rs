//! Engine events.
//!
//! * [`OrderCreatedEvent`] is published after every successful checkout. The stock reconciler subscribes to it.
//! * [`OrderStatusChangedEvent`] is published when a payment notification completes or cancels an order.
mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::*;
pub use hooks::{EventHandlers, EventHooks, EventProducers};
