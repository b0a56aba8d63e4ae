use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::menu::{MenuItem, Price};
use crate::session::{ConversationState, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
}

/// Immutable record of a confirmed purchase.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    #[serde(rename = "orderId")]
    pub order_id: Uuid,
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub items: Vec<MenuItem>,
    pub address: String,
    pub subtotal: Price,
    #[serde(rename = "deliveryFee")]
    pub delivery_fee: Price,
    pub total: Price,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match serde_json::to_string_pretty(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "Order {}", self.order_id),
        }
    }
}

/// Projects a session awaiting confirmation into an order.
///
/// The session is left untouched; callers reset it themselves. The
/// conversation only calls this from `Confirming`, where the cart and
/// address are guaranteed to be present.
pub fn finalize(session: &Session) -> Order {
    debug_assert_eq!(session.state(), ConversationState::Confirming);
    debug_assert!(!session.cart().is_empty());

    let subtotal = session.subtotal();
    Order {
        order_id: Uuid::new_v4(),
        customer_id: session.customer_id().to_string(),
        items: session.cart().to_vec(),
        address: session.address().unwrap_or_default().to_string(),
        subtotal,
        delivery_fee: session.delivery_fee(),
        total: session.total(),
        created_at: Utc::now(),
        status: OrderStatus::Confirmed,
    }
}

/// Receives every order the conversation confirms, once each.
pub trait OrderSink: Send + Sync {
    fn accept(&self, order: Order);
}

/// Logs confirmed orders and keeps them for the lifetime of the process.
#[derive(Default)]
pub struct OrderLog {
    orders: RwLock<Vec<Order>>,
}

impl OrderLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.orders.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderSink for OrderLog {
    fn accept(&self, order: Order) {
        tracing::info!(
            order_id = %order.order_id,
            customer_id = %order.customer_id,
            total = %order.total,
            "🎉 New order confirmed\n{}",
            order
        );
        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(order);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::Menu;

    fn confirming_session(menu: &Menu) -> Session {
        let mut session = Session::new("5511988887777@c.us");
        session.start_order();
        session.choose_meal(menu.find_meal_by_position(2).unwrap().clone());
        session.add_beverage(menu.find_beverage_by_position(2).unwrap().clone());
        session.collect_address("Rua das Flores, 123 - Centro", menu.delivery_fee());
        session
    }

    #[test]
    fn finalize_snapshots_the_session() {
        let menu = Menu::default();
        let session = confirming_session(&menu);
        let before = session.clone();

        let order = finalize(&session);
        assert_eq!(session, before);
        assert_eq!(order.customer_id, "5511988887777@c.us");
        assert_eq!(order.items, session.cart());
        assert_eq!(order.address, "Rua das Flores, 123 - Centro");
        assert_eq!(order.subtotal.to_string(), "19.00");
        assert_eq!(order.delivery_fee.to_string(), "3.00");
        assert_eq!(order.total.to_string(), "22.00");
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[test]
    fn orders_get_distinct_ids() {
        let menu = Menu::default();
        let session = confirming_session(&menu);
        assert_ne!(finalize(&session).order_id, finalize(&session).order_id);
    }

    #[test]
    fn order_log_keeps_orders() {
        let menu = Menu::default();
        let log = OrderLog::new();
        assert!(log.is_empty());

        let order = finalize(&confirming_session(&menu));
        log.accept(order.clone());
        assert_eq!(log.orders(), vec![order]);
    }

    #[test]
    fn order_json_uses_camel_case_keys() {
        let menu = Menu::default();
        let order = finalize(&confirming_session(&menu));
        let json: serde_json::Value = serde_json::from_str(&order.to_string()).unwrap();
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["total"], 22.0);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("deliveryFee").is_some());
    }
}
