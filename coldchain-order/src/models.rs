use chrono::{DateTime, Utc};
use coldchain_core::{ReadingLog, TemperatureReading};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order status in the custody chain
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    AtCompany,
    AcceptedByLogisticsCompany,
    RejectedByLogisticsCompany,
    AcceptedByRetailer,
    RejectedByRetailer,
    AcceptedByStore,
    RejectedByStore,
    AcceptedByCustomer,
    RejectedByCustomer,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::AtCompany => "AT_COMPANY",
            OrderStatus::AcceptedByLogisticsCompany => "ACCEPTED_BY_LOGISTICS_COMPANY",
            OrderStatus::RejectedByLogisticsCompany => "REJECTED_BY_LOGISTICS_COMPANY",
            OrderStatus::AcceptedByRetailer => "ACCEPTED_BY_RETAILER",
            OrderStatus::RejectedByRetailer => "REJECTED_BY_RETAILER",
            OrderStatus::AcceptedByStore => "ACCEPTED_BY_STORE",
            OrderStatus::RejectedByStore => "REJECTED_BY_STORE",
            OrderStatus::AcceptedByCustomer => "ACCEPTED_BY_CUSTOMER",
            OrderStatus::RejectedByCustomer => "REJECTED_BY_CUSTOMER",
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            OrderStatus::RejectedByLogisticsCompany
                | OrderStatus::RejectedByRetailer
                | OrderStatus::RejectedByStore
                | OrderStatus::RejectedByCustomer
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::AcceptedByCustomer | OrderStatus::RejectedByCustomer
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safe-for-consumption flag. Moves from `Yes` to `No` at most once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdibilityStatus {
    Yes,
    No,
}

impl EdibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdibilityStatus::Yes => "YES",
            EdibilityStatus::No => "NO",
        }
    }
}

impl fmt::Display for EdibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intermediate custody handoffs that run a compliance check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Logistics,
    Retailer,
    Store,
}

impl Stage {
    pub fn accepted(&self) -> OrderStatus {
        match self {
            Stage::Logistics => OrderStatus::AcceptedByLogisticsCompany,
            Stage::Retailer => OrderStatus::AcceptedByRetailer,
            Stage::Store => OrderStatus::AcceptedByStore,
        }
    }

    pub fn rejected(&self) -> OrderStatus {
        match self {
            Stage::Logistics => OrderStatus::RejectedByLogisticsCompany,
            Stage::Retailer => OrderStatus::RejectedByRetailer,
            Stage::Store => OrderStatus::RejectedByStore,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Logistics => "LOGISTICS",
            Stage::Retailer => "RETAILER",
            Stage::Store => "STORE",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOGISTICS" => Ok(Stage::Logistics),
            "RETAILER" => Ok(Stage::Retailer),
            "STORE" => Ok(Stage::Store),
            _ => Err(UnknownStage(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unknown handoff stage: {0}")]
pub struct UnknownStage(pub String);

/// Any point in the chain where a decision is taken
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Checkpoint {
    Logistics,
    Retailer,
    Store,
    Customer,
}

impl Checkpoint {
    /// Statuses an order normally holds when it reaches this checkpoint
    pub fn expected_prior(&self) -> &'static [OrderStatus] {
        match self {
            Checkpoint::Logistics => &[OrderStatus::AtCompany],
            Checkpoint::Retailer => &[
                OrderStatus::AcceptedByLogisticsCompany,
                OrderStatus::RejectedByLogisticsCompany,
            ],
            Checkpoint::Store => &[
                OrderStatus::AcceptedByRetailer,
                OrderStatus::RejectedByRetailer,
            ],
            Checkpoint::Customer => &[
                OrderStatus::AcceptedByStore,
                OrderStatus::RejectedByStore,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Checkpoint::Logistics => "LOGISTICS",
            Checkpoint::Retailer => "RETAILER",
            Checkpoint::Store => "STORE",
            Checkpoint::Customer => "CUSTOMER",
        }
    }
}

impl From<Stage> for Checkpoint {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Logistics => Checkpoint::Logistics,
            Stage::Retailer => Checkpoint::Retailer,
            Stage::Store => Checkpoint::Store,
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A perishable shipment tracked through the custody chain.
///
/// Status, edibility and readings change only through
/// [`OrderStateMachine`](crate::manager::OrderStateMachine).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub commodity_type: String,
    pub unit_count: u32,
    pub contract_id: String,
    status: OrderStatus,
    edibility_status: EdibilityStatus,
    #[serde(default)]
    readings: ReadingLog,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(id: String, commodity_type: String, unit_count: u32, contract_id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            commodity_type,
            unit_count,
            contract_id,
            status: OrderStatus::AtCompany,
            edibility_status: EdibilityStatus::Yes,
            readings: ReadingLog::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn edibility_status(&self) -> EdibilityStatus {
        self.edibility_status
    }

    pub fn is_edible(&self) -> bool {
        self.edibility_status == EdibilityStatus::Yes
    }

    pub fn readings(&self) -> &ReadingLog {
        &self.readings
    }

    pub fn has_readings(&self) -> bool {
        !self.readings.is_empty()
    }

    pub(crate) fn push_reading(&mut self, reading: TemperatureReading) {
        self.readings.record(reading);
        self.updated_at = Utc::now();
    }

    pub(crate) fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    /// One-way: there is no counterpart that sets `Yes`.
    pub(crate) fn mark_inedible(&mut self) {
        self.edibility_status = EdibilityStatus::No;
        self.updated_at = Utc::now();
    }
}
