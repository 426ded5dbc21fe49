//! Application assembly: the routed service with its middleware stack, and logging setup.

use std::time::Duration;

use axum::Router;
use axum::http::{Method, Request, header};
use axum::response::Response;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, Environment};
use crate::routes;
use crate::state::AppState;

/// Routes bound to `state`, wrapped in request tracing and CORS.
pub fn build(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = request.uri().path(),
                status = tracing::field::Empty,
            )
        })
        .on_response(|response: &Response, latency: Duration, span: &Span| {
            span.record("status", response.status().as_u16());
            tracing::debug!(elapsed_ms = latency.as_millis(), "finished");
        });

    routes::router()
        .with_state(state)
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
}

/// Any origin outside production; only `CORS_ORIGINS` in production.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.environment != Environment::Production {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_origins.iter().cloned()))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(60 * 60))
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at `log_level` and dependencies stay quiet.
pub fn init_tracing(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "{}={log_level},tower_http=info,sea_orm=warn",
            env!("CARGO_CRATE_NAME")
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
