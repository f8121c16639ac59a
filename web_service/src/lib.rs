use std::sync::Arc;

use axum::{
    http::{Request, Uri},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use db_service::DbService;

pub mod orders;
pub mod route_handlers;
pub mod verification;

pub const SHOPIFY_ORDER_PATH: &str = "/webhook/shopify-order";

pub struct AppState {
    pub db: DbService,
    pub webhook_secret: Option<String>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new(db: DbService, webhook_secret: Option<String>) -> SharedAppState {
        Arc::new(AppState { db, webhook_secret })
    }
}

/**
 * main router for the app, the shopify webhook route plus a healthcheck,
 * wrapped in request logging
 **/
pub fn get_main_router(state: SharedAppState) -> Router {
    tracing::debug!("initializing router(s) ...");
    tracing::info!("Shopify order webhook route: {}", SHOPIFY_ORDER_PATH);

    Router::new()
        .route(
            SHOPIFY_ORDER_PATH,
            post(route_handlers::webhooks::shopify_order_handler),
        )
        .route("/healthcheck", get(|| async { "Ok" }))
        .with_state(state)
        .layer(axum::middleware::from_fn(uri_middleware))
        .layer(TraceLayer::new_for_http().on_response(
            |response: &Response, latency: std::time::Duration, _span: &Span| {
                let url = match response.extensions().get::<RequestUri>().map(|r| &r.0) {
                    Some(uri) => uri.to_string(),
                    None => "unknown".to_string(),
                };
                let status = response.status();
                let latency = format!("{:.2}ms", latency.as_secs_f64() * 1000.0);

                if url == "/healthcheck" {
                    tracing::trace!("{} {} {}", url, status, latency);
                    return;
                }

                tracing::debug!("{} {} {}", url, status, latency);
            },
        ))
}

struct RequestUri(Uri);

async fn uri_middleware<B>(request: Request<B>, next: Next<B>) -> Response {
    let uri = request.uri().clone();

    let mut response = next.run(request).await;

    response.extensions_mut().insert(RequestUri(uri));

    response
}
