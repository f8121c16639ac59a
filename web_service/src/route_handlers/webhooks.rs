use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use shared_lib::structs::Order;

use crate::{orders, verification, SharedAppState};

pub async fn shopify_order_handler(
    State(state): State<SharedAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(verification::HMAC_HEADER)
        .map(|value| value.as_bytes());

    if let Err(error) =
        verification::verify_webhook(&body, signature, state.webhook_secret.as_deref())
    {
        tracing::warn!("Rejected Shopify webhook: {}", error);
        return error.into_response();
    }

    let order: Order = match serde_json::from_slice(&body) {
        Ok(order) => order,
        Err(error) => {
            tracing::error!("Error processing order: {:?}", error);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    tracing::debug!("Processing order with {} line item(s)", order.line_items.len());

    let results = orders::process_order(&state.db, &order).await;
    orders::log_summary(&results);

    (StatusCode::OK, "Stock updated successfully").into_response()
}
