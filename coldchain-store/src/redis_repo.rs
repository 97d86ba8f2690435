use async_trait::async_trait;
use coldchain_core::Contract;
use coldchain_order::registry::{BoxError, ContractRegistry, OrderRegistry, RegistryError};
use coldchain_order::Order;
use redis::AsyncCommands;
use tracing::info;

/// Registry backed by Redis: one JSON document per order and per contract.
#[derive(Clone)]
pub struct RedisRegistry {
    client: redis::Client,
}

impl RedisRegistry {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn get_json(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    /// SET with a condition flag (`NX` or `XX`); `false` when the
    /// condition did not hold.
    async fn set_json_if(&self, key: &str, value: &str, condition: &str) -> Result<bool, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg(condition)
            .query_async(&mut conn)
            .await?;
        Ok(result.is_some())
    }
}

fn order_key(order_id: &str) -> String {
    format!("order:{}", order_id)
}

fn contract_key(contract_id: &str) -> String {
    format!("contract:{}", contract_id)
}

#[async_trait]
impl OrderRegistry for RedisRegistry {
    async fn get_order(&self, id: &str) -> Result<Option<Order>, BoxError> {
        match self.get_json(&order_key(id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn add_order(&self, order: &Order) -> Result<(), BoxError> {
        let json = serde_json::to_string(order)?;
        if !self.set_json_if(&order_key(&order.id), &json, "NX").await? {
            return Err(RegistryError::AlreadyExists(order.id.clone()).into());
        }
        info!("Order stored: {}", order.id);
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), BoxError> {
        let json = serde_json::to_string(order)?;
        if !self.set_json_if(&order_key(&order.id), &json, "XX").await? {
            return Err(RegistryError::NotFound(order.id.clone()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ContractRegistry for RedisRegistry {
    async fn get_contract(&self, id: &str) -> Result<Option<Contract>, BoxError> {
        match self.get_json(&contract_key(id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn add_contract(&self, contract: &Contract) -> Result<(), BoxError> {
        let json = serde_json::to_string(contract)?;
        if !self.set_json_if(&contract_key(&contract.id), &json, "NX").await? {
            return Err(RegistryError::AlreadyExists(contract.id.clone()).into());
        }
        info!("Contract stored: {}", contract.id);
        Ok(())
    }
}
