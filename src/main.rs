use {
    axum::{
        Router,
        extract::DefaultBodyLimit,
        routing::{get, post},
    },
    medipay::{
        AppState, adapters, config::AppConfig, domain::notify::LogNotifier,
        gateway::razorpay::RazorpayGateway,
    },
    sqlx::postgres::PgPoolOptions,
    std::{sync::Arc, time::Duration},
    tokio::signal,
    tower_http::timeout::TimeoutLayer,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    let gateway = RazorpayGateway::new(
        config.gateway_base_url.clone(),
        config.gateway_key_id.clone(),
        config.gateway_key_secret.clone(),
        Duration::from_millis(config.gateway_timeout_ms),
        reqwest::Client::new(),
    );

    let state = AppState {
        pool,
        gateway: Arc::new(gateway),
        notifier: Arc::new(LogNotifier),
        keys: Arc::new(config.keys()),
    };

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/payments/order", post(adapters::orders::create_order))
        .route(
            "/payments/order/{order_id}",
            get(adapters::orders::order_status),
        )
        .route("/payments/verify", post(adapters::checkout::verify_payment))
        .route("/payments/webhook", post(adapters::webhook::gateway_webhook))
        .route(
            "/payments/{id}/refund",
            post(adapters::refunds::refund_payment),
        )
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(DefaultBodyLimit::max(64 * 1024)) // webhook payloads are small
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind");
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl+c");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to listen for SIGTERM")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl+c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
