use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single temperature observation reported by a sensor
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TemperatureReading {
    pub celsius: f64,
    pub observed_at: DateTime<Utc>,
}

impl TemperatureReading {
    pub fn new(celsius: f64, observed_at: DateTime<Utc>) -> Self {
        Self { celsius, observed_at }
    }
}

/// Append-only history of readings for one order, in arrival order.
///
/// There is intentionally no way to remove or reorder entries. Values are
/// stored as reported, including physically implausible ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReadingLog(Vec<TemperatureReading>);

impl ReadingLog {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn record(&mut self, reading: TemperatureReading) {
        self.0.push(reading);
    }

    pub fn as_slice(&self) -> &[TemperatureReading] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TemperatureReading> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&TemperatureReading> {
        self.0.last()
    }
}

impl FromIterator<TemperatureReading> for ReadingLog {
    fn from_iter<I: IntoIterator<Item = TemperatureReading>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ReadingLog {
    type Item = &'a TemperatureReading;
    type IntoIter = std::slice::Iter<'a, TemperatureReading>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
