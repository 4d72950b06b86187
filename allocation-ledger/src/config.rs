//! Configuration for allocation-ledger

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{AllocationError, Result};
use crate::quota::types::{Principal, QuotaKey};

/// Owner identity used by the development configuration
pub const DEFAULT_OWNER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";

/// Main ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Quotas defined by the owner when the ledger starts
    #[serde(default)]
    pub quotas: Vec<SeedQuota>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// The only identity allowed to define quotas
    pub owner: Principal,
}

/// Optional input checks; all off by default
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Reject zero amounts and zero capacities
    #[serde(default)]
    pub reject_zero_amounts: bool,
    /// Upper bound for a quota's total capacity
    #[serde(default)]
    pub max_total_capacity: Option<u64>,
}

impl ValidationConfig {
    /// Check a capacity passed to a quota definition
    pub fn check_capacity(&self, total_capacity: u64) -> Result<()> {
        if self.reject_zero_amounts && total_capacity == 0 {
            return Err(AllocationError::InvalidAmount(
                "total capacity must be greater than zero".to_string(),
            ));
        }
        if let Some(max) = self.max_total_capacity {
            if total_capacity > max {
                return Err(AllocationError::InvalidAmount(format!(
                    "total capacity {} exceeds maximum {}",
                    total_capacity, max
                )));
            }
        }
        Ok(())
    }

    /// Check an amount passed to check/commit/release
    pub fn check_amount(&self, amount: u64) -> Result<()> {
        if self.reject_zero_amounts && amount == 0 {
            return Err(AllocationError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. "info" or "allocation_ledger=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
    /// One of "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// A quota created at startup
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeedQuota {
    pub period: i32,
    pub region: String,
    pub total_capacity: u64,
}

impl SeedQuota {
    pub fn key(&self) -> QuotaKey {
        QuotaKey::new(self.period, self.region.clone())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const LOG_FORMATS: &[&str] = &["pretty", "json", "compact"];

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AllocationError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| AllocationError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Create a default development configuration
    pub fn development() -> Self {
        Self {
            ledger: LedgerConfig {
                owner: Principal::new(DEFAULT_OWNER),
            },
            validation: ValidationConfig::default(),
            logging: LoggingConfig::default(),
            quotas: Vec::new(),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.ledger.owner.as_str().trim().is_empty() {
            return Err(AllocationError::Config("Owner must not be empty".to_string()));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(AllocationError::Config(format!(
                "Unknown log format '{}', expected one of {:?}",
                self.logging.format, LOG_FORMATS
            )));
        }

        let mut seen = HashSet::new();
        for seed in &self.quotas {
            let key = seed.key();
            if !seen.insert(key.clone()) {
                return Err(AllocationError::Config(format!(
                    "Duplicate seed quota {}",
                    key
                )));
            }
            self.validation
                .check_capacity(seed.total_capacity)
                .map_err(|e| AllocationError::Config(format!("Seed quota {}: {}", key, e)))?;
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::development()
    }
}
