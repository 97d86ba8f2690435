use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Temperature, timing and price terms agreed for a shipment.
/// Shared by reference between orders; never mutated after setup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    pub id: String,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub arrival_deadline: DateTime<Utc>,
    pub unit_price: i32, // cents
}

impl Contract {
    pub fn new(
        id: String,
        min_temperature: f64,
        max_temperature: f64,
        arrival_deadline: DateTime<Utc>,
        unit_price: i32,
    ) -> Result<Self, ContractError> {
        let contract = Self {
            id,
            min_temperature,
            max_temperature,
            arrival_deadline,
            unit_price,
        };
        contract.validate()?;
        Ok(contract)
    }

    /// Check the range invariant. Records coming back from a registry are
    /// not trusted to have gone through `new`.
    pub fn validate(&self) -> Result<(), ContractError> {
        if !self.min_temperature.is_finite()
            || !self.max_temperature.is_finite()
            || self.min_temperature > self.max_temperature
        {
            return Err(ContractError::InvalidRange {
                contract_id: self.id.clone(),
                min: self.min_temperature,
                max: self.max_temperature,
            });
        }
        Ok(())
    }

    pub fn is_late(&self, at: DateTime<Utc>) -> bool {
        at > self.arrival_deadline
    }

    /// Amount owed for `unit_count` units, in cents
    pub fn payout(&self, unit_count: u32) -> i64 {
        i64::from(self.unit_price).saturating_mul(i64::from(unit_count))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ContractError {
    #[error("Contract {contract_id} has invalid temperature range [{min}, {max}]")]
    InvalidRange {
        contract_id: String,
        min: f64,
        max: f64,
    },
}
