use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use mercado_api::config;
use mercado_api::database::{schema, DatabaseManager};
use mercado_api::middleware::auth_middleware;
use mercado_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::info!("Starting mercado-api in {:?} mode", config.environment);

    let db = Arc::new(DatabaseManager::connect(&config.database)?);
    if let Err(e) = schema::ensure_main_schema(db.main_pool()).await {
        // Boot degraded; /health reports the database state
        tracing::warn!("Could not apply main schema at startup: {}", e);
    }

    let state = AppState::new(db.clone(), config);
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("MERCADO_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("mercado-api listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API (bearer JWT)
        .merge(protected_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;
    use mercado_api::handlers::public::{auth, catalog};

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/business/public/:tenant", get(catalog::business_info))
        .route("/products/public/all-random", get(catalog::discovery_feed))
        .route(
            "/products/public/business/:tenant",
            get(catalog::business_catalog),
        )
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::{patch, post};
    use mercado_api::handlers::protected::{business, products};

    Router::new()
        .route("/business", post(business::create))
        .route("/business/my", post(business::my))
        .route("/products", post(products::create).get(products::list))
        .route("/products/sale", post(products::register_sale))
        .route("/products/history", get(products::history))
        .route(
            "/products/:id",
            patch(products::update).delete(products::delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Mercado API",
            "version": version,
            "description": "Multi-tenant marketplace backend with per-merchant database provisioning",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "discovery": "/products/public/all-random, /products/public/business/:tenant (public)",
                "business_info": "/business/public/:tenant (public)",
                "business": "/business, /business/my (protected)",
                "products": "/products[/:id], /products/sale, /products/history (protected)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.db.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
