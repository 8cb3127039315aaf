use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepass::config::Config;
use gatepass::expiry::{ExpiryWindow, DEFAULT_EXPIRY_DAYS};
use gatepass::handlers::{self, AppState};
use gatepass::service::LicenseService;
use gatepass::store::{create_pool, init_db};

#[derive(Parser, Debug)]
#[command(name = "gatepass")]
#[command(about = "Invite-code licensing service")]
struct Cli {
    /// Issue one demo access code on startup (dev mode only)
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gatepass=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState {
        licenses: LicenseService::new(pool),
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set GATEPASS_ENV=dev)");
        } else {
            seed_demo_code(&state);
        }
    }

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Gatepass server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

/// Issues a single default-window code so a fresh dev setup has something
/// to validate against.
fn seed_demo_code(state: &AppState) {
    match state
        .licenses
        .generate_code(ExpiryWindow::Days(DEFAULT_EXPIRY_DAYS))
    {
        Ok(code) => {
            tracing::info!("============================================");
            tracing::info!("DEMO ACCESS CODE ISSUED");
            tracing::info!("Code: {}", code);
            tracing::info!("============================================");
        }
        Err(e) => tracing::error!("Failed to seed demo code: {}", e),
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
