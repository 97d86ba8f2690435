use crate::models::Order;
use async_trait::async_trait;
use coldchain_core::Contract;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Durable store for order records, keyed by order id
#[async_trait]
pub trait OrderRegistry: Send + Sync {
    async fn get_order(&self, id: &str) -> Result<Option<Order>, BoxError>;

    async fn add_order(&self, order: &Order) -> Result<(), BoxError>;

    /// Replace the full record of an existing order
    async fn update_order(&self, order: &Order) -> Result<(), BoxError>;
}

/// Read-mostly store for contract terms
#[async_trait]
pub trait ContractRegistry: Send + Sync {
    async fn get_contract(&self, id: &str) -> Result<Option<Contract>, BoxError>;

    async fn add_contract(&self, contract: &Contract) -> Result<(), BoxError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Record already exists: {0}")]
    AlreadyExists(String),
}

/// Process-local order store
#[derive(Default)]
pub struct InMemoryOrderRegistry {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRegistry for InMemoryOrderRegistry {
    async fn get_order(&self, id: &str) -> Result<Option<Order>, BoxError> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn add_order(&self, order: &Order) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(RegistryError::AlreadyExists(order.id.clone()).into());
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        let slot = orders
            .get_mut(&order.id)
            .ok_or_else(|| RegistryError::NotFound(order.id.clone()))?;
        *slot = order.clone();
        Ok(())
    }
}

/// Process-local contract store
#[derive(Default)]
pub struct InMemoryContractRegistry {
    contracts: RwLock<HashMap<String, Contract>>,
}

impl InMemoryContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContractRegistry for InMemoryContractRegistry {
    async fn get_contract(&self, id: &str) -> Result<Option<Contract>, BoxError> {
        Ok(self.contracts.read().await.get(id).cloned())
    }

    async fn add_contract(&self, contract: &Contract) -> Result<(), BoxError> {
        let mut contracts = self.contracts.write().await;
        if contracts.contains_key(&contract.id) {
            return Err(RegistryError::AlreadyExists(contract.id.clone()).into());
        }
        contracts.insert(contract.id.clone(), contract.clone());
        Ok(())
    }
}
