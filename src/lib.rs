//! Marmita Ordering Agent
//!
//! A scripted chat agent that walks a customer through ordering a boxed meal
//! ("marmita") over a messaging channel: greeting, meal choice, optional
//! beverage, delivery address, confirmation.
//!
//! # Architecture
//!
//! * `menu` - Static catalog: meals, beverages, delivery fee
//! * `session` - Per-customer conversation state and the in-memory session store
//! * `conversation` - The state machine mapping (session, text) to (session, reply)
//! * `replies` - Customer-facing texts (Brazilian Portuguese)
//! * `order` - Order finalization and order sinks
//! * `agent` - `handle_message`, the single entry point for inbound text
//! * `api` - HTTP webhook the messaging channel posts to
//! * `config` - Environment configuration
//! * `error` - Error handling and HTTP response mapping
//!
//! ## Conversation flow
//!
//! ```text
//! initial --(anything)--> selecting_meal --(1..N)--> selecting_beverage
//!     --(1..M | nao | finalizar)--> collecting_address --(>= 10 chars)-->
//!     confirming --(confirmar)--> initial   (order emitted)
//!                --(cancelar)---> initial
//! ```
//!
//! Two guards run before the table in every state: a menu keyword
//! (`cardapio`, `menu`) shows the catalog without touching the session, and a
//! greeting (`oi`, `bom dia`, ...) restarts the order from the meal list.
//! Keywords match anywhere in the message.
//!
//! # Environment Configuration
//!
//! ```bash
//! HOST=127.0.0.1                # Server host
//! PORT=3000                     # Server port
//! MENU_FILE=static/menu.json    # Optional; built-in menu when unset
//! API_KEYS=key1,key2            # Optional; gateway is open when unset
//! RUST_LOG=info                 # Logging level
//! ```
//!
//! # API Endpoints
//!
//! ## POST /messages
//! ```json
//! { "from": "5511999990000@c.us", "body": "oi" }
//! ```
//! Responds with `{ "reply": "..." }`, or `{ "reply": null }` for group and
//! broadcast senders.
//!
//! ## GET /menu
//! The loaded menu.
//!
//! ## GET /sessions/:customer_id, DELETE /sessions/:customer_id
//! Inspect or reset a customer's conversation.
//!
//! ## GET /orders
//! Orders confirmed since the process started.
//!
//! # Example Usage
//!
//! ```rust
//! use marmita_agent::agent::OrderAgent;
//! use marmita_agent::menu::Menu;
//! use marmita_agent::order::OrderLog;
//! use marmita_agent::session::SessionStore;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let orders = Arc::new(OrderLog::new());
//! let agent = OrderAgent::new(Menu::default(), SessionStore::new(), orders.clone());
//!
//! let reply = agent.handle_message("5511999990000@c.us", "oi").await;
//! assert!(reply.contains("Vegana"));
//! # }
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod menu;
pub mod order;
pub mod replies;
pub mod session;
