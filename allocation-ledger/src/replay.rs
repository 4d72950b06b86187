//! Replay scripts: run a TOML list of ledger operations
//!
//! ```toml
//! [[steps]]
//! op = "define"
//! period = 2023
//! region = "Colorado River Basin"
//! amount = 10000
//! caller = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"
//!
//! [[steps]]
//! op = "check"
//! period = 2023
//! region = "Colorado River Basin"
//! amount = 3000
//! ```
//!
//! A failing step is recorded in its outcome and the script carries on.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{AllocationError, Result};
use crate::quota::{Principal, QuotaKey, QuotaLedger, QuotaRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Define,
    Check,
    Commit,
    Release,
    Get,
}

impl Operation {
    /// Operations that take a caller identity
    pub fn needs_caller(&self) -> bool {
        matches!(self, Operation::Define | Operation::Commit | Operation::Release)
    }

    /// Operations that take an amount (a capacity for `define`)
    pub fn needs_amount(&self) -> bool {
        !matches!(self, Operation::Get)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Define => "define",
            Operation::Check => "check",
            Operation::Commit => "commit",
            Operation::Release => "release",
            Operation::Get => "get",
        };
        f.write_str(name)
    }
}

/// One scripted call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayStep {
    pub op: Operation,
    pub period: i32,
    pub region: String,
    /// Capacity for `define`, amount for the others; unused by `get`
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub caller: Option<Principal>,
}

impl ReplayStep {
    pub fn key(&self) -> QuotaKey {
        QuotaKey::new(self.period, self.region.clone())
    }

    /// Check that the step carries the caller and amount its operation needs
    pub fn check_inputs(&self, index: usize) -> Result<()> {
        let missing = if self.op.needs_caller() && self.caller.is_none() {
            "a caller"
        } else if self.op.needs_amount() && self.amount.is_none() {
            "an amount"
        } else {
            return Ok(());
        };

        Err(AllocationError::Parse(format!(
            "Step {} ({} {}) requires {}",
            index,
            self.op,
            self.key(),
            missing
        )))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    pub index: usize,
    pub op: Operation,
    pub key: QuotaKey,
    pub ok: bool,
    /// Set by `check`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    /// Set by `get` when the quota exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<QuotaRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplayScript {
    /// Load a script from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse a script from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let script: ReplayScript = toml::from_str(content)
            .map_err(|e| AllocationError::Parse(format!("Failed to parse replay script: {}", e)))?;

        for (index, step) in script.steps.iter().enumerate() {
            step.check_inputs(index)?;
        }

        Ok(script)
    }

    /// Run every step against `ledger`, in order
    pub async fn run(&self, ledger: &QuotaLedger) -> Vec<ReplayOutcome> {
        let mut outcomes = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            outcomes.push(run_step(ledger, index, step).await);
        }
        outcomes
    }
}

/// Whether any outcome failed
pub fn has_failures(outcomes: &[ReplayOutcome]) -> bool {
    outcomes.iter().any(|o| !o.ok)
}

async fn run_step(ledger: &QuotaLedger, index: usize, step: &ReplayStep) -> ReplayOutcome {
    let mut outcome = ReplayOutcome {
        index,
        op: step.op,
        key: step.key(),
        ok: true,
        available: None,
        record: None,
        error: None,
    };

    let inputs = step.check_inputs(index);
    let result = match (inputs, step.op, step.caller.as_ref(), step.amount) {
        (Err(e), ..) => Err(e),
        (Ok(()), Operation::Get, _, _) => {
            outcome.record = ledger.get_quota(step.period, &step.region).await;
            Ok(())
        }
        (Ok(()), Operation::Check, _, Some(amount)) => ledger
            .check_availability(step.period, &step.region, amount)
            .await
            .map(|available| outcome.available = Some(available)),
        (Ok(()), Operation::Define, Some(caller), Some(amount)) => {
            ledger
                .define_quota(step.period, &step.region, amount, caller)
                .await
        }
        (Ok(()), Operation::Commit, Some(caller), Some(amount)) => {
            ledger.commit(step.period, &step.region, amount, caller).await
        }
        (Ok(()), Operation::Release, Some(caller), Some(amount)) => {
            ledger.release(step.period, &step.region, amount, caller).await
        }
        (Ok(()), op, _, _) => Err(AllocationError::Parse(format!(
            "Step {} ({} {}) is missing its inputs",
            index, op, outcome.key
        ))),
    };

    if let Err(e) = result {
        outcome.ok = false;
        outcome.error = Some(e.to_string());
    }
    outcome
}
