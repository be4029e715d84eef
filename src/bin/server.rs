use std::sync::Arc;

use axum::serve;
use dotenv::dotenv;
use log::{info, warn};

use waymark::server::{router, AppState};
use waymark::{Config, CredentialStore, InMemoryCredentials, RouteManager};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing `.env` file is fine, the environment may be set directly.
    if dotenv().is_err() {
        eprintln!("No .env file found, reading configuration from the environment");
    }

    waymark::util::trace::initialize_tracer();

    let config = Config::from_env()?;
    let manager = RouteManager::from_config(&config)?;

    let credentials = InMemoryCredentials::default();
    if let Some(admin) = &config.admin {
        if !credentials.register(&admin.username, &admin.email, &admin.password) {
            warn!("Could not register seed account {}", admin.username);
        }
    }

    let state = Arc::new(AppState::new(manager, Arc::new(credentials)));
    let app = router(state.clone(), &config.allowed_origins);

    let addr = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Starting server on {:?}", addr.local_addr()?);

    serve(addr, app).await?;

    info!("Terminating server.");
    if let Err(err) = state.manager.flush() {
        warn!("Could not flush the graph on shutdown: {err}");
    }

    Ok(())
}
