use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::{LedgerStats, Principal, QuotaKey, QuotaRecord};
use crate::config::{Config, ValidationConfig};
use crate::error::{AllocationError, Result};

/// Ledger of period/region quotas
///
/// Cloning yields another handle to the same ledger. Every check-then-mutate
/// step runs under a single write guard, so concurrent commits and releases
/// on a key cannot both pass their capacity checks.
#[derive(Clone)]
pub struct QuotaLedger {
    quotas: Arc<RwLock<HashMap<QuotaKey, QuotaRecord>>>,
    owner: Principal,
    validation: ValidationConfig,
}

impl QuotaLedger {
    /// Create an empty ledger owned by `owner`
    pub fn new(owner: Principal) -> Self {
        Self::with_validation(owner, ValidationConfig::default())
    }

    /// Create an empty ledger with input validation settings
    pub fn with_validation(owner: Principal, validation: ValidationConfig) -> Self {
        QuotaLedger {
            quotas: Arc::new(RwLock::new(HashMap::new())),
            owner,
            validation,
        }
    }

    /// Build a ledger from configuration and define its seed quotas as the owner
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let ledger = Self::with_validation(config.ledger.owner.clone(), config.validation.clone());
        for seed in &config.quotas {
            ledger
                .define_quota(seed.period, &seed.region, seed.total_capacity, &config.ledger.owner)
                .await?;
        }

        info!(
            owner = %ledger.owner,
            seeded = config.quotas.len(),
            "Quota ledger initialized"
        );
        Ok(ledger)
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Define (or redefine) the capacity of a quota
    ///
    /// Only the owner may call this. An existing record is replaced and its
    /// committed amount reset to zero.
    pub async fn define_quota(
        &self,
        period: i32,
        region: &str,
        total_capacity: u64,
        caller: &Principal,
    ) -> Result<()> {
        if *caller != self.owner {
            warn!(caller = %caller, period, region, "Rejected quota definition from non-owner");
            return Err(AllocationError::NotAuthorized {
                caller: caller.to_string(),
            });
        }
        self.validation.check_capacity(total_capacity)?;

        let key = QuotaKey::new(period, region);
        let mut quotas = self.quotas.write().await;
        if let Some(previous) = quotas.insert(key.clone(), QuotaRecord::new(total_capacity)) {
            if previous.committed_amount > 0 {
                warn!(
                    key = %key,
                    discarded = previous.committed_amount,
                    "Redefinition discarded committed amount"
                );
            }
        }

        info!(key = %key, total_capacity, "Quota defined");
        Ok(())
    }

    /// Get the current record, if the quota was ever defined
    pub async fn get_quota(&self, period: i32, region: &str) -> Option<QuotaRecord> {
        let quotas = self.quotas.read().await;
        quotas.get(&QuotaKey::new(period, region)).copied()
    }

    /// Whether `requested_amount` fits in the remaining capacity
    pub async fn check_availability(
        &self,
        period: i32,
        region: &str,
        requested_amount: u64,
    ) -> Result<bool> {
        self.validation.check_amount(requested_amount)?;

        let key = QuotaKey::new(period, region);
        let quotas = self.quotas.read().await;
        let record = quotas.get(&key).ok_or_else(|| not_found(&key))?;

        let available = record.fits(requested_amount);
        debug!(
            key = %key,
            requested_amount,
            remaining = record.available(),
            available,
            "Availability checked"
        );
        Ok(available)
    }

    /// Commit `amount` against a quota
    ///
    /// Fails without touching the record when the new committed amount would
    /// exceed total capacity.
    pub async fn commit(
        &self,
        period: i32,
        region: &str,
        amount: u64,
        caller: &Principal,
    ) -> Result<()> {
        self.validation.check_amount(amount)?;

        let key = QuotaKey::new(period, region);
        let mut quotas = self.quotas.write().await;
        let record = quotas.get_mut(&key).ok_or_else(|| not_found(&key))?;

        let new_committed = match record.committed_amount.checked_add(amount) {
            Some(total) if total <= record.total_capacity => total,
            _ => {
                warn!(
                    key = %key,
                    caller = %caller,
                    amount,
                    available = record.available(),
                    "Commit rejected: insufficient capacity"
                );
                return Err(AllocationError::InsufficientCapacity {
                    requested: amount,
                    available: record.available(),
                });
            }
        };

        record.committed_amount = new_committed;
        info!(
            key = %key,
            caller = %caller,
            amount,
            committed = new_committed,
            "Amount committed"
        );
        Ok(())
    }

    /// Release a previously committed `amount` back to the quota
    pub async fn release(
        &self,
        period: i32,
        region: &str,
        amount: u64,
        caller: &Principal,
    ) -> Result<()> {
        self.validation.check_amount(amount)?;

        let key = QuotaKey::new(period, region);
        let mut quotas = self.quotas.write().await;
        let record = quotas.get_mut(&key).ok_or_else(|| not_found(&key))?;

        if amount > record.committed_amount {
            warn!(
                key = %key,
                caller = %caller,
                amount,
                committed = record.committed_amount,
                "Release rejected: exceeds committed amount"
            );
            return Err(AllocationError::ExcessiveRelease {
                requested: amount,
                committed: record.committed_amount,
            });
        }

        record.committed_amount -= amount;
        info!(
            key = %key,
            caller = %caller,
            amount,
            committed = record.committed_amount,
            "Amount released"
        );
        Ok(())
    }

    /// All quotas, ordered by period then region
    pub async fn list_quotas(&self) -> Vec<(QuotaKey, QuotaRecord)> {
        let quotas = self.quotas.read().await;
        let mut entries: Vec<_> = quotas.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub async fn quota_count(&self) -> usize {
        let quotas = self.quotas.read().await;
        quotas.len()
    }

    /// Aggregate capacity and commitment across all quotas
    pub async fn stats(&self) -> LedgerStats {
        let quotas = self.quotas.read().await;
        quotas.values().fold(
            LedgerStats {
                quota_count: quotas.len(),
                ..Default::default()
            },
            |mut stats, record| {
                stats.total_capacity = stats.total_capacity.saturating_add(record.total_capacity);
                stats.total_committed =
                    stats.total_committed.saturating_add(record.committed_amount);
                if record.is_exhausted() {
                    stats.exhausted += 1;
                }
                stats
            },
        )
    }
}

fn not_found(key: &QuotaKey) -> AllocationError {
    debug!(key = %key, "No allocation found");
    AllocationError::QuotaNotFound {
        period: key.period,
        region: key.region.clone(),
    }
}
