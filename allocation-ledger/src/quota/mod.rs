/// Period/region quota ledger
///
/// This module provides:
/// - Quota definition restricted to a single owner identity
/// - Availability checks against remaining capacity
/// - Commit and release of amounts, never exceeding capacity

pub mod manager;
pub mod types;

pub use manager::QuotaLedger;
pub use types::{LedgerStats, Principal, QuotaKey, QuotaRecord};
