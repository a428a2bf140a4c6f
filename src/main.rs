use std::sync::Arc;

use axum::Router;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagelure::billing::CreditRuleTable;
use pagelure::config::Config;
use pagelure::db::{create_pool, init_db, queries, AppState};
use pagelure::handlers;
use pagelure::ledger;
use pagelure::models::CreateUser;
use pagelure::payments::{CardProcessorClient, CheckoutPlatformClient};

#[derive(Parser, Debug)]
#[command(name = "pagelure")]
#[command(about = "Credit ledger and payment reconciliation backend for trackable pages")]
struct Cli {
    /// Seed the database with a dev user holding a starting balance
    #[arg(long)]
    seed: bool,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

fn seed_dev_data(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection for seed");

    let input = CreateUser {
        email: "dev@example.com".to_string(),
        name: "Dev User".to_string(),
    };

    match queries::create_user(&conn, &input) {
        Ok(user) => {
            ledger::credit(&conn, &user.id, 1000).expect("Failed to seed credits");
            tracing::info!(
                "Seeded dev user: email={}, public_token={}, credits=1000",
                user.email,
                user.public_token
            );
        }
        Err(e) => {
            tracing::info!("Dev user not seeded (probably exists already): {}", e);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagelure=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    if config.card_processor_webhook_secret.is_empty()
        || config.checkout_platform_webhook_secret.is_empty()
    {
        tracing::warn!(
            "One or both webhook secrets are empty - webhook deliveries will fail verification"
        );
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");

    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        db: db_pool,
        card_processor: CardProcessorClient::new(config.card_processor_webhook_secret.clone()),
        checkout_platform: CheckoutPlatformClient::new(
            config.checkout_platform_webhook_secret.clone(),
        ),
        rules: Arc::new(CreditRuleTable::default_tariff()),
        page_cost: config.page_cost,
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set PAGELURE_ENV=dev)");
        } else {
            seed_dev_data(&state);
        }
    }

    let app = Router::new()
        // Account and page endpoints
        .merge(handlers::api_router())
        // Webhook endpoints (provider signature auth)
        .merge(handlers::webhooks::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Pagelure server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
