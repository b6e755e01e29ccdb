#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{config::RuntimeConfiguration, routes::router, state::RosterState};
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod auth;
mod config;
mod controller;
mod data;
mod directory;
mod error;
mod maud_conveniences;
mod routes;
mod state;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("no .env loaded ({e}), using the process environment");
    }

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RuntimeConfiguration::new().expect("unable to create config");
    info!(
        environment = ?config.identity_config().environment(),
        provider = %config.identity_config().endpoint(),
        "Loaded config"
    );
    let state = RosterState::new(config.clone()).await;

    let app = router(state);

    let server_address = config.server_address();
    let listener = TcpListener::bind(server_address)
        .await
        .expect("unable to listen on server ip");

    info!(?server_address, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("unable to serve app");
}
