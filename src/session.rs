use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::menu::{MenuItem, Price};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Initial,
    SelectingMeal,
    SelectingBeverage,
    CollectingAddress,
    Confirming,
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = serde_plain::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&name)
    }
}

/// Conversation context for a single customer.
///
/// Fields are only changed through the transition methods below so the cart,
/// address and total always agree with `state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "customerId")]
    customer_id: String,
    state: ConversationState,
    cart: Vec<MenuItem>,
    address: Option<String>,
    #[serde(rename = "deliveryFee")]
    delivery_fee: Price,
    total: Price,
}

impl Session {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            state: ConversationState::Initial,
            cart: Vec::new(),
            address: None,
            delivery_fee: Price::ZERO,
            total: Price::ZERO,
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn cart(&self) -> &[MenuItem] {
        &self.cart
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// Cart subtotal plus delivery fee. Zero until the address is collected.
    pub fn total(&self) -> Price {
        self.total
    }

    pub fn delivery_fee(&self) -> Price {
        self.delivery_fee
    }

    pub fn subtotal(&self) -> Price {
        self.cart.iter().map(|item| item.price).sum()
    }

    /// Drops any order in progress and waits for a meal choice.
    pub fn start_order(&mut self) {
        self.reset();
        self.state = ConversationState::SelectingMeal;
    }

    /// A meal replaces whatever was in the cart.
    pub fn choose_meal(&mut self, meal: MenuItem) {
        self.cart = vec![meal];
        self.state = ConversationState::SelectingBeverage;
    }

    pub fn add_beverage(&mut self, beverage: MenuItem) {
        self.cart.push(beverage);
        self.state = ConversationState::CollectingAddress;
    }

    pub fn skip_beverage(&mut self) {
        self.state = ConversationState::CollectingAddress;
    }

    pub fn collect_address(&mut self, address: impl Into<String>, delivery_fee: Price) {
        self.address = Some(address.into());
        self.delivery_fee = delivery_fee;
        self.total = self.subtotal() + delivery_fee;
        self.state = ConversationState::Confirming;
    }

    pub fn reset(&mut self) {
        self.state = ConversationState::Initial;
        self.cart.clear();
        self.address = None;
        self.delivery_fee = Price::ZERO;
        self.total = Price::ZERO;
    }
}

pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// In-memory sessions keyed by customer identifier.
///
/// Each customer gets their own async mutex; holding it serializes that
/// customer's messages while other customers proceed independently.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the customer's session, creating it on first contact.
    pub fn get_or_create(&self, customer_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(customer_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(customer_id, "Creating session");
                Arc::new(tokio::sync::Mutex::new(Session::new(customer_id)))
            })
            .clone()
    }

    fn get(&self, customer_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get(customer_id).cloned()
    }

    /// Copy of the session as it stands, without creating one.
    pub async fn snapshot(&self, customer_id: &str) -> Option<Session> {
        let handle = self.get(customer_id)?;
        let session = handle.lock().await;
        Some(session.clone())
    }

    /// Returns `false` when the customer has never written in.
    pub async fn reset(&self, customer_id: &str) -> bool {
        match self.get(customer_id) {
            Some(handle) => {
                handle.lock().await.reset();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
