use axum::{
    routing::{get, patch},
    Extension, Router,
};
use immediaid_server::store::{AlertStore, DbAlertStore};
use immediaid_server::{api, migrator};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    immediaid_server::telemetry::init_telemetry("immediaid-server");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    // Database Connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    immediaid_server::metrics::init_metrics(&db).await;

    // The canonical shared Alert Store every device and responder sees.
    let store: Arc<dyn AlertStore> = Arc::new(DbAlertStore::new(db.clone()));

    let app = app(db, store, prometheus_layer, metric_handle);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());
    let addr: SocketAddr = bind_addr.parse().expect("BIND_ADDR must be host:port");
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

fn app(
    db: DatabaseConnection,
    store: Arc<dyn AlertStore>,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/sos",
            get(api::sos::list_sos_alerts).post(api::sos::create_sos_alert),
        )
        .route("/api/sos/:id", patch(api::sos::resolve_sos_alert))
        .route(
            "/api/news",
            get(api::news::list_news).post(api::news::create_news),
        )
        .route("/api/news/:id", axum::routing::delete(api::news::delete_news))
        .route(
            "/api/emergency-contacts",
            get(api::emergency_contacts::list_emergency_contacts)
                .post(api::emergency_contacts::create_emergency_contact),
        )
        .route(
            "/api/emergency-contacts/:id",
            axum::routing::delete(api::emergency_contacts::delete_emergency_contact),
        )
        .layer(Extension(db))
        .layer(Extension(store))
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // Span name "METHOD /path" (e.g. "POST /api/sos")
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    let client_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        client_ip = client_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Filled in by handlers
                        alert_id = tracing::field::Empty,
                        emergency_type = tracing::field::Empty,
                        // Recorded on response
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(
                    |_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                        // Skip the default "started processing request" event
                    },
                )
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            // Mobile clients call from device-local origins, so no origin
            // allow-list and no credentials.
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
