use dotenv::dotenv;
use marmita_agent::agent::OrderAgent;
use marmita_agent::api::{self, AppState};
use marmita_agent::config::Config;
use marmita_agent::error::{AppError, AppResult};
use marmita_agent::order::OrderLog;
use marmita_agent::session::SessionStore;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Main entry point for the ordering agent.
///
/// This function:
/// 1. Loads environment variables from .env file
/// 2. Loads the menu and wires the agent to an in-memory order log
/// 3. Serves the message webhook until Ctrl-C
#[tokio::main]
async fn main() -> AppResult<()> {
    dotenv().ok();

    // Initialize the logging subscriber
    FmtSubscriber::builder()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false)
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .pretty()
        .init();

    info!("🚀 Starting marmita ordering agent");
    let config = Config::from_env()?;

    let menu = config.load_menu()?;
    info!(
        restaurant = menu.restaurant_name(),
        meals = menu.list_meals().count(),
        beverages = menu.list_beverages().count(),
        delivery_fee = %menu.delivery_fee(),
        "Menu loaded"
    );

    let orders = Arc::new(OrderLog::new());
    let agent = OrderAgent::new(menu, SessionStore::new(), orders.clone());
    if config.api_keys.is_empty() {
        tracing::warn!("API_KEYS is not set; the message webhook accepts unauthenticated requests");
    }
    let app = api::create_router(AppState::new(agent, orders, config.api_keys.clone()));

    let addr = config.addr()?;
    info!("🤖 Listening for messages on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await
        .map_err(|e| AppError::Server(e.to_string()))
}
