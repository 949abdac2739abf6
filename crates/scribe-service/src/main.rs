use scribe_service::{
    DefaultAppState,
    config::Settings,
    db,
    llm::{HuggingFaceClient, OpenAiClient},
    news::NewsApiClient,
    routes::create_router,
    shutdown::{GracefulShutdownLayer, ShutdownState},
};
use axum::http::StatusCode;
use std::{
    process,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Requests still running after `timeout` are answered with 408
fn request_timeout(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Log a startup failure and exit
fn fatal(context: &str, err: impl std::fmt::Display) -> ! {
    error!(error = %err, "{context}");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "scribe_service=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env().unwrap_or_else(|err| fatal("Invalid configuration", err));

    let connection = db::establish_connection(&settings.database_url).unwrap_or_else(|err| {
        error!(database_url = %settings.database_url, error = %err, "Failed to open database");
        process::exit(1);
    });
    info!(database_url = %settings.database_url, "Connected to database, migrations applied");

    let timeout = settings.request_timeout;
    let completions = OpenAiClient::new(settings.openai.clone(), timeout)
        .unwrap_or_else(|err| fatal("Failed to build completion client", err));
    let summarizer = HuggingFaceClient::new(settings.hugging_face.clone(), timeout)
        .unwrap_or_else(|err| fatal("Failed to build summarization client", err));
    let news = NewsApiClient::new(settings.news_api.clone(), timeout)
        .unwrap_or_else(|err| fatal("Failed to build news client", err));

    if settings.news_api.api_key.is_empty() {
        warn!("NEWS_API_KEY is not set, news search requests will be rejected upstream");
    }

    let bind_address = settings.bind_address.clone();
    let app_state = DefaultAppState::new(
        Arc::new(Mutex::new(connection)),
        completions,
        summarizer,
        news,
        settings,
    );
    let shutdown_state = ShutdownState::new();

    let app = create_router()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(GracefulShutdownLayer::new(shutdown_state.clone()))
                .layer(request_timeout(timeout)),
        )
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .unwrap_or_else(|err| {
            error!(bind_address = %bind_address, error = %err, "Failed to bind to address");
            process::exit(1);
        });

    info!(bind_address = %bind_address, "Server running");

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_state));

    if let Err(err) = server.await {
        fatal("Server error", err);
    }
}

async fn shutdown_signal(shutdown_state: ShutdownState) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
    let drained = shutdown_state.completed();
    shutdown_state.start_shutdown();

    drained.await;
    info!("Graceful shutdown completed");
}
