use std::sync::Arc;

use crate::conversation::{self, Effect, Inbound, Transition};
use crate::menu::Menu;
use crate::order::OrderSink;
use crate::session::SessionStore;

const LOGGED_REPLY_CHARS: usize = 100;

/// Entry point the message gateway calls for every inbound text.
#[derive(Clone)]
pub struct OrderAgent {
    menu: Arc<Menu>,
    sessions: SessionStore,
    orders: Arc<dyn OrderSink>,
}

impl OrderAgent {
    pub fn new(menu: Menu, sessions: SessionStore, orders: Arc<dyn OrderSink>) -> Self {
        Self {
            menu: Arc::new(menu),
            sessions,
            orders,
        }
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs one message through the customer's conversation and returns the
    /// reply to send back.
    ///
    /// The customer's session stays locked from read to commit, so messages
    /// from one customer apply in arrival order. A confirmed order goes to
    /// the sink only after the session has been updated.
    pub async fn handle_message(&self, customer_id: &str, text: &str) -> String {
        let input = Inbound::new(text);
        let handle = self.sessions.get_or_create(customer_id);

        let (effect, reply) = {
            let mut session = handle.lock().await;
            let Transition {
                session: next,
                reply,
                effect,
            } = conversation::transition(&session, &input, &self.menu);

            if next.state() != session.state() {
                tracing::debug!(
                    customer_id,
                    from = %session.state(),
                    to = %next.state(),
                    "Conversation state changed"
                );
            }
            *session = next;

            tracing::info!(
                customer_id,
                text = %input.text(),
                reply = %preview(&reply),
                "Handled message"
            );
            (effect, reply)
        };

        if let Some(Effect::PlaceOrder(order)) = effect {
            self.orders.accept(order);
        }
        reply
    }
}

fn preview(reply: &str) -> String {
    match reply.char_indices().nth(LOGGED_REPLY_CHARS) {
        Some((end, _)) => format!("{}...", &reply[..end]),
        None => reply.to_string(),
    }
}
