use crate::events::ShipmentEvent;
use crate::manager::{Decision, OrderError, OrderStateMachine, Transition};
use crate::models::{Order, Stage};
use crate::registry::{BoxError, ContractRegistry, OrderRegistry};
use chrono::{DateTime, Utc};
use coldchain_core::{Contract, ContractError, TemperatureReading};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info};

/// Result of routing one event
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    ReadingRecorded(Order),
    Evaluated(Transition),
}

impl Dispatched {
    pub fn order(&self) -> &Order {
        match self {
            Dispatched::ReadingRecorded(order) => order,
            Dispatched::Evaluated(transition) => &transition.order,
        }
    }

    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Dispatched::ReadingRecorded(_) => None,
            Dispatched::Evaluated(transition) => Some(&transition.decision),
        }
    }
}

/// Routes custody events to the state machine and writes the result back.
///
/// Events for the same order are applied one at a time; different orders
/// never wait on each other.
pub struct EventDispatcher {
    orders: Arc<dyn OrderRegistry>,
    contracts: Arc<dyn ContractRegistry>,
    locks: OrderLocks,
}

impl EventDispatcher {
    pub fn new(orders: Arc<dyn OrderRegistry>, contracts: Arc<dyn ContractRegistry>) -> Self {
        Self {
            orders,
            contracts,
            locks: OrderLocks::default(),
        }
    }

    pub async fn dispatch(&self, event: ShipmentEvent) -> Result<Dispatched, DispatchError> {
        match event {
            ShipmentEvent::TemperatureReading {
                order_id,
                celsius,
                timestamp,
            } => self
                .record_reading(&order_id, celsius, timestamp)
                .await
                .map(Dispatched::ReadingRecorded),
            ShipmentEvent::Handoff {
                order_id,
                stage,
                timestamp,
            } => self
                .handoff(&order_id, stage, timestamp)
                .await
                .map(Dispatched::Evaluated),
            ShipmentEvent::CustomerScan { order_id, timestamp } => self
                .customer_scan(&order_id, timestamp)
                .await
                .map(Dispatched::Evaluated),
        }
    }

    pub async fn record_reading(
        &self,
        order_id: &str,
        celsius: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Order, DispatchError> {
        // Registry documents are JSON, which has no NaN or infinity
        if !celsius.is_finite() {
            return Err(DispatchError::InvalidReading {
                order_id: order_id.to_string(),
            });
        }

        let _guard = self.locks.acquire(order_id).await;
        let order = self.load_order(order_id).await?;

        let order = OrderStateMachine::record_reading(
            order,
            TemperatureReading::new(celsius, observed_at),
        );
        self.write_back(&order).await?;
        Ok(order)
    }

    pub async fn handoff(
        &self,
        order_id: &str,
        stage: Stage,
        at: DateTime<Utc>,
    ) -> Result<Transition, DispatchError> {
        let _guard = self.locks.acquire(order_id).await;
        let order = self.load_order(order_id).await?;
        let contract = self.load_contract(&order).await?;

        let transition = OrderStateMachine::handoff_at_stage(order, &contract, stage, at)?;
        self.write_back(&transition.order).await?;

        info!(
            "Order {} handed to {}: {}",
            order_id, stage, transition.decision.status
        );
        Ok(transition)
    }

    pub async fn customer_scan(
        &self,
        order_id: &str,
        at: DateTime<Utc>,
    ) -> Result<Transition, DispatchError> {
        let _guard = self.locks.acquire(order_id).await;
        let order = self.load_order(order_id).await?;
        let contract = self.load_contract(&order).await?;

        let transition = OrderStateMachine::customer_scan(order, &contract, at)?;
        self.write_back(&transition.order).await?;

        info!(
            "Order {} scanned by customer: {}",
            order_id, transition.decision.status
        );
        Ok(transition)
    }

    /// Retry the write-back of an order whose transition was already computed
    /// (see [`DispatchError::NotPersisted`]). The transition is not re-applied.
    pub async fn persist(&self, order: &Order) -> Result<(), DispatchError> {
        let _guard = self.locks.acquire(&order.id).await;
        self.write_back(order).await
    }

    async fn load_order(&self, order_id: &str) -> Result<Order, DispatchError> {
        self.orders
            .get_order(order_id)
            .await
            .map_err(DispatchError::Registry)?
            .ok_or_else(|| DispatchError::OrderNotFound(order_id.to_string()))
    }

    async fn load_contract(&self, order: &Order) -> Result<Contract, DispatchError> {
        let contract = self
            .contracts
            .get_contract(&order.contract_id)
            .await
            .map_err(DispatchError::Registry)?
            .ok_or_else(|| DispatchError::ContractNotFound(order.contract_id.clone()))?;
        contract.validate()?;
        Ok(contract)
    }

    async fn write_back(&self, order: &Order) -> Result<(), DispatchError> {
        self.orders.update_order(order).await.map_err(|source| {
            error!("Failed to persist order {}: {}", order.id, source);
            DispatchError::NotPersisted {
                order: Box::new(order.clone()),
                source,
            }
        })
    }
}

/// One async mutex per order key
#[derive(Default)]
struct OrderLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl OrderLocks {
    async fn acquire(&self, order_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().await;
            // Drop entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(order_id.to_string()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Contract not found: {0}")]
    ContractNotFound(String),

    #[error(transparent)]
    InvalidContract(#[from] ContractError),

    #[error("Temperature reading for order {order_id} is not a finite number")]
    InvalidReading { order_id: String },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Registry(BoxError),

    /// The transition was computed but the registry refused the write.
    /// `order` holds the transitioned record; hand it to
    /// [`EventDispatcher::persist`] rather than replaying the event.
    #[error("Order {} transitioned but not persisted: {source}", .order.id)]
    NotPersisted { order: Box<Order>, source: BoxError },
}
