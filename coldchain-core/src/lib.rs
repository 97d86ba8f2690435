pub mod reading;
pub mod contract;
pub mod compliance;

pub use reading::{ReadingLog, TemperatureReading};
pub use contract::{Contract, ContractError};
pub use compliance::{evaluate, ComplianceError, Verdict};
