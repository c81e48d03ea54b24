use std::{io::ErrorKind, net::SocketAddr};

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    commands,
    core::{
        config::{Config, DeployTarget},
        errors::{AppError, AppResult},
    },
    AppState,
};

pub fn cors_layer(origins: &[String]) -> AppResult<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| AppError::Config(format!("invalid CORS origin '{origin}'")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

pub fn router(state: AppState, cors_origins: &[String]) -> AppResult<Router> {
    let max_upload_bytes = state.max_upload_bytes;
    Ok(Router::new()
        .route("/", get(commands::health::root))
        .route("/health", get(commands::health::health))
        .route(
            "/api/test",
            get(commands::health::diagnostics).post(commands::health::diagnostics_echo),
        )
        .route("/extract", post(commands::extract::extract))
        .route(
            "/api/deleteUserFromAuth",
            post(commands::accounts::delete_user_from_auth),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors_layer(cors_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Binds the listener. Long-running servers step to the next port when the configured one is taken.
pub async fn bind(port: u16, target: DeployTarget) -> AppResult<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == ErrorKind::AddrInUse && target == DeployTarget::Server => {
            let fallback = port.checked_add(1).ok_or_else(|| {
                AppError::Config(format!("port {port} is in use and has no successor"))
            })?;
            warn!(port, fallback, "port is already in use, trying the next one");
            Ok(TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], fallback))).await?)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn serve(config: &Config, state: AppState) -> AppResult<()> {
    let app = router(state, &config.cors_origins)?;
    let listener = bind(config.port, config.deploy_target).await?;
    let local = listener.local_addr()?;
    info!(address = %local, target = ?config.deploy_target, "server is running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("could not install ctrl-c handler, shutdown only on process exit");
        std::future::pending::<()>().await;
    }
}
