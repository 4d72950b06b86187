use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite lookup key: a period (e.g. a year) and a region
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuotaKey {
    pub period: i32,
    pub region: String,
}

impl QuotaKey {
    pub fn new(period: i32, region: impl Into<String>) -> Self {
        QuotaKey {
            period,
            region: region.into(),
        }
    }
}

impl fmt::Display for QuotaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.period, self.region)
    }
}

/// Capacity and current commitment of one quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    /// Capacity ceiling
    pub total_capacity: u64,
    /// Amount currently committed against the ceiling
    pub committed_amount: u64,
}

impl QuotaRecord {
    /// Fresh record with nothing committed
    pub fn new(total_capacity: u64) -> Self {
        QuotaRecord {
            total_capacity,
            committed_amount: 0,
        }
    }

    /// Remaining capacity
    pub fn available(&self) -> u64 {
        self.total_capacity.saturating_sub(self.committed_amount)
    }

    /// Whether `amount` fits in the remaining capacity (boundary inclusive)
    pub fn fits(&self, amount: u64) -> bool {
        amount <= self.available()
    }

    pub fn is_exhausted(&self) -> bool {
        self.committed_amount >= self.total_capacity
    }

    /// Committed share of capacity as a percentage
    pub fn usage_percent(&self) -> f64 {
        if self.total_capacity == 0 {
            return 0.0;
        }
        (self.committed_amount as f64 / self.total_capacity as f64) * 100.0
    }
}

/// Opaque caller identity, compared by equality only
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Principal(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Principal::new(id)
    }
}

impl From<String> for Principal {
    fn from(id: String) -> Self {
        Principal(id)
    }
}

/// Aggregate figures across every defined quota
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub quota_count: usize,
    pub total_capacity: u64,
    pub total_committed: u64,
    /// Quotas with no remaining capacity
    pub exhausted: usize,
}
