use std::sync::Arc;
use coldchain_order::{ContractRegistry, EventDispatcher, OrderRegistry};
use coldchain_shared::models::events::ShipmentNotification;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<EventDispatcher>,
    pub orders: Arc<dyn OrderRegistry>,
    pub contracts: Arc<dyn ContractRegistry>,
    pub notifications: broadcast::Sender<ShipmentNotification>,
}

impl AppState {
    pub fn new(
        orders: Arc<dyn OrderRegistry>,
        contracts: Arc<dyn ContractRegistry>,
        stream_capacity: usize,
    ) -> Self {
        let (notifications, _) = broadcast::channel(stream_capacity);
        Self {
            dispatcher: Arc::new(EventDispatcher::new(orders.clone(), contracts.clone())),
            orders,
            contracts,
            notifications,
        }
    }
}
