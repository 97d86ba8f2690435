use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use coldchain_core::TemperatureReading;
use coldchain_order::{Decision, Dispatched, Order, ShipmentEvent, Stage, Transition};
use coldchain_shared::models::events::{
    OrderEvaluatedEvent, ReadingRecordedEvent, ShipmentNotification,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RecordReadingRequest {
    pub celsius: f64,
    /// Defaults to the time the request is received
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CheckpointRequest {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub commodity_type: String,
    pub unit_count: u32,
    pub contract_id: String,
    pub status: String,
    pub edibility_status: String,
    pub readings: Vec<TemperatureReading>,
    pub payout_cents: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluationResponse {
    pub order: OrderResponse,
    pub decision: Decision,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventResponse {
    Evaluated(EvaluationResponse),
    Recorded(OrderResponse),
}

impl OrderResponse {
    fn from_order(order: &Order, payout_cents: Option<i64>) -> Self {
        Self {
            id: order.id.clone(),
            commodity_type: order.commodity_type.clone(),
            unit_count: order.unit_count,
            contract_id: order.contract_id.clone(),
            status: order.status().to_string(),
            edibility_status: order.edibility_status().to_string(),
            readings: order.readings().iter().copied().collect(),
            payout_cents,
            updated_at: order.updated_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/orders/{order_id}", get(get_order))
        .route("/v1/orders/{order_id}/readings", post(record_reading))
        .route("/v1/orders/{order_id}/handoffs/{stage}", post(handoff))
        .route("/v1/orders/{order_id}/scan", post(customer_scan))
        .route("/v1/events", post(dispatch_event))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/orders/{order_id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .get_order(&order_id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Order not found: {}", order_id)))?;

    let payout = payout_for(&state, &order).await;
    Ok(Json(OrderResponse::from_order(&order, payout)))
}

/// POST /v1/orders/{order_id}/readings
pub async fn record_reading(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<RecordReadingRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let observed_at = req.timestamp.unwrap_or_else(Utc::now);
    let order = state
        .dispatcher
        .record_reading(&order_id, req.celsius, observed_at)
        .await?;

    publish_reading(&state, &order);
    let payout = payout_for(&state, &order).await;
    Ok(Json(OrderResponse::from_order(&order, payout)))
}

/// POST /v1/orders/{order_id}/handoffs/{stage}
pub async fn handoff(
    State(state): State<AppState>,
    Path((order_id, stage)): Path<(String, String)>,
    Json(req): Json<CheckpointRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let stage: Stage = stage
        .parse()
        .map_err(|e: coldchain_order::models::UnknownStage| AppError::ValidationError(e.to_string()))?;
    let at = req.timestamp.unwrap_or_else(Utc::now);

    let transition = state.dispatcher.handoff(&order_id, stage, at).await?;
    Ok(Json(evaluated(&state, transition).await))
}

/// POST /v1/orders/{order_id}/scan
pub async fn customer_scan(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(req): Json<CheckpointRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let at = req.timestamp.unwrap_or_else(Utc::now);

    let transition = state.dispatcher.customer_scan(&order_id, at).await?;
    Ok(Json(evaluated(&state, transition).await))
}

/// POST /v1/events
/// Accepts any inbound shipment event as produced by sensors and parties
pub async fn dispatch_event(
    State(state): State<AppState>,
    Json(event): Json<ShipmentEvent>,
) -> Result<Json<EventResponse>, AppError> {
    tracing::debug!("Dispatching event for order {}", event.order_id());

    let response = match state.dispatcher.dispatch(event).await? {
        Dispatched::ReadingRecorded(order) => {
            publish_reading(&state, &order);
            let payout = payout_for(&state, &order).await;
            EventResponse::Recorded(OrderResponse::from_order(&order, payout))
        }
        Dispatched::Evaluated(transition) => {
            EventResponse::Evaluated(evaluated(&state, transition).await)
        }
    };
    Ok(Json(response))
}

// ============================================================================
// Helpers
// ============================================================================

async fn evaluated(state: &AppState, transition: Transition) -> EvaluationResponse {
    let Transition { order, decision } = transition;

    // No subscribers is not an error
    let _ = state
        .notifications
        .send(ShipmentNotification::OrderEvaluated(evaluated_event(&decision)));

    let payout = payout_for(state, &order).await;
    EvaluationResponse {
        order: OrderResponse::from_order(&order, payout),
        decision,
    }
}

fn publish_reading(state: &AppState, order: &Order) {
    if let Some(reading) = order.readings().last() {
        let _ = state
            .notifications
            .send(ShipmentNotification::ReadingRecorded(ReadingRecordedEvent {
                event_id: Uuid::new_v4(),
                order_id: order.id.clone(),
                celsius: reading.celsius,
                observed_at: reading.observed_at.timestamp(),
                reading_count: order.readings().len(),
            }));
    }
}

fn evaluated_event(decision: &Decision) -> OrderEvaluatedEvent {
    OrderEvaluatedEvent {
        event_id: Uuid::new_v4(),
        order_id: decision.order_id.clone(),
        checkpoint: decision.checkpoint.to_string(),
        status: decision.status.to_string(),
        edibility_status: decision.edibility_status.to_string(),
        lowest_celsius: decision.verdict.map(|v| v.lowest.celsius),
        highest_celsius: decision.verdict.map(|v| v.highest.celsius),
        arrived_late: decision.arrived_late,
        timestamp: decision.decided_at.timestamp(),
    }
}

/// Payout is informational; a missing contract just omits it
async fn payout_for(state: &AppState, order: &Order) -> Option<i64> {
    match state.contracts.get_contract(&order.contract_id).await {
        Ok(Some(contract)) => Some(contract.payout(order.unit_count)),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Contract lookup failed for {}: {}", order.contract_id, e);
            None
        }
    }
}
