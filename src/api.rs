use axum::{
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::agent::OrderAgent;
use crate::error::{AppError, AppResult};
use crate::menu::Menu;
use crate::order::{Order, OrderLog};
use crate::session::Session;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Inbound event as the messaging channel delivers it.
#[derive(Debug, Serialize, Deserialize)]
pub struct InboundMessage {
    pub from: String,
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub reply: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    agent: OrderAgent,
    orders: Arc<OrderLog>,
    api_keys: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(agent: OrderAgent, orders: Arc<OrderLog>, api_keys: Vec<String>) -> Self {
        Self {
            agent,
            orders,
            api_keys: Arc::new(api_keys),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/messages", post(receive_message))
        .route("/menu", get(get_menu))
        .route("/sessions/:customer_id", get(get_session).delete(reset_session))
        .route("/orders", get(list_orders))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

/// Group chats and status broadcasts never get a reply.
pub fn is_ignored_sender(from: &str) -> bool {
    from.contains("@g.us") || from == "status@broadcast"
}

async fn require_api_key<B>(
    State(state): State<AppState>,
    request: Request<B>,
    next: Next<B>,
) -> AppResult<Response> {
    if state.api_keys.is_empty() {
        return Ok(next.run(request).await);
    }

    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start_matches("Bearer ").trim())
        .map_or(false, |key| state.api_keys.iter().any(|known| known == key));

    if !authorized {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

async fn receive_message(
    State(state): State<AppState>,
    Json(message): Json<InboundMessage>,
) -> AppResult<Json<MessageResponse>> {
    let from = message.from.trim();
    if from.is_empty() {
        return Err(AppError::InvalidInput("from must not be empty".to_string()));
    }
    if is_ignored_sender(from) {
        tracing::debug!(from, "Ignoring message from group or broadcast");
        return Ok(Json(MessageResponse { reply: None }));
    }

    let reply = state.agent.handle_message(from, &message.body).await;
    Ok(Json(MessageResponse { reply: Some(reply) }))
}

async fn get_menu(State(state): State<AppState>) -> Json<Menu> {
    Json(state.agent.menu().clone())
}

async fn get_session(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> AppResult<Json<Session>> {
    let session = state.agent.sessions().snapshot(&customer_id).await;
    match session {
        Some(session) => Ok(Json(session)),
        None => Err(AppError::SessionNotFound(customer_id)),
    }
}

async fn reset_session(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> AppResult<StatusCode> {
    if state.agent.sessions().reset(&customer_id).await {
        tracing::info!(customer_id = %customer_id, "Session reset");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::SessionNotFound(customer_id))
    }
}

async fn list_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.orders.orders())
}
