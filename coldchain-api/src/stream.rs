use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_util::{Stream, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/orders/{order_id}/stream", get(order_stream))
}

/// GET /v1/orders/{order_id}/stream
/// Server-sent readings and decisions for one order
pub async fn order_stream(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    state
        .orders
        .get_order(&order_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    let rx = state.notifications.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let order_id = order_id.clone();
        async move {
            match result {
                Ok(notification) if notification.order_id() == order_id => Event::default()
                    .event(notification.event_name())
                    .json_data(&notification)
                    .ok()
                    .map(Ok),
                Ok(_) => None,
                Err(e) => {
                    // Slow subscriber; skip what was dropped
                    tracing::warn!("Order stream lagged: {}", e);
                    None
                }
            }
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
