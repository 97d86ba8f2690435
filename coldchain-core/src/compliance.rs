use crate::contract::Contract;
use crate::reading::TemperatureReading;
use serde::{Deserialize, Serialize};

/// Outcome of checking a reading history against a contract
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub lowest: TemperatureReading,
    pub highest: TemperatureReading,
    pub violates_low: bool,
    pub violates_high: bool,
    pub compliant: bool,
}

/// Scan every reading recorded so far and compare the extremes to the
/// contract range.
///
/// Ties resolve to the first minimal reading and the last maximal one. Only
/// the values feed the verdict, so the choice never changes the outcome.
///
/// A NaN sorts to one of the extremes and never falls inside the range, so
/// it always counts as a violation.
pub fn evaluate(
    readings: &[TemperatureReading],
    contract: &Contract,
) -> Result<Verdict, ComplianceError> {
    let lowest = readings
        .iter()
        .min_by(|a, b| a.celsius.total_cmp(&b.celsius))
        .ok_or(ComplianceError::NoReadings)?;
    let highest = readings
        .iter()
        .max_by(|a, b| a.celsius.total_cmp(&b.celsius))
        .ok_or(ComplianceError::NoReadings)?;

    let violates_low = lowest.celsius.is_nan() || lowest.celsius < contract.min_temperature;
    let violates_high = highest.celsius.is_nan() || highest.celsius > contract.max_temperature;

    Ok(Verdict {
        lowest: *lowest,
        highest: *highest,
        violates_low,
        violates_high,
        compliant: !violates_low && !violates_high,
    })
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("Cannot evaluate compliance without any temperature readings")]
    NoReadings,
}
