use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::{DateTime, Duration, Utc};
use coldchain_core::Contract;
use coldchain_order::{BoxError, ContractRegistry, Order, OrderRegistry, RegistryError};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

pub const DEMO_CONTRACT_ID: &str = "CON_001";
pub const DEMO_ORDER_ID: &str = "ORDER_001";

#[derive(Debug, Serialize, Deserialize)]
pub struct DemoSetupResponse {
    pub contract_id: String,
    pub order_id: String,
    pub arrival_deadline: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/demo/setup", post(setup_demo))
}

/// Seed one chilled-chicken contract and a fresh order bound to it.
/// The shipment must arrive within a day of `now`.
pub async fn seed_demo(
    orders: &dyn OrderRegistry,
    contracts: &dyn ContractRegistry,
    now: DateTime<Utc>,
) -> Result<DemoSetupResponse, BoxError> {
    let contract = Contract::new(
        DEMO_CONTRACT_ID.to_string(),
        2.0,
        10.0,
        now + Duration::days(1),
        100, // cents per unit
    )?;
    let order = Order::new(
        DEMO_ORDER_ID.to_string(),
        "CHICKEN".to_string(),
        100,
        DEMO_CONTRACT_ID.to_string(),
    );

    // Order first: a failed order insert must not strand the contract
    orders.add_order(&order).await?;
    contracts.add_contract(&contract).await?;

    tracing::info!("Demo order {} seeded under contract {}", order.id, contract.id);
    Ok(DemoSetupResponse {
        contract_id: contract.id,
        order_id: order.id,
        arrival_deadline: contract.arrival_deadline,
    })
}

/// POST /v1/demo/setup
pub async fn setup_demo(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<DemoSetupResponse>), AppError> {
    let seeded = seed_demo(state.orders.as_ref(), state.contracts.as_ref(), Utc::now())
        .await
        .map_err(|e| match e.downcast_ref::<RegistryError>() {
            Some(RegistryError::AlreadyExists(_)) => AppError::ConflictError(e.to_string()),
            _ => AppError::InternalServerError(e.to_string()),
        })?;

    Ok((StatusCode::CREATED, Json(seeded)))
}
