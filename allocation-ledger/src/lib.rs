//! allocation-ledger: period/region quota ledger
//!
//! Tracks finite capacity quotas keyed by a period (e.g. a year) and a
//! region, and guarantees that the amount committed against each quota never
//! exceeds its total capacity.
//!
//! # Operations
//!
//! - **Define**: set a quota's capacity (owner only; resets commitments)
//! - **Check**: does a requested amount fit in what remains?
//! - **Commit**: record an amount against the quota
//! - **Release**: return a committed amount to the quota
//!
//! # Example
//!
//! ```no_run
//! use allocation_ledger::quota::{Principal, QuotaLedger};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let owner = Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
//!     let ledger = QuotaLedger::new(owner.clone());
//!
//!     ledger.define_quota(2023, "Colorado River Basin", 10000, &owner).await?;
//!     ledger.commit(2023, "Colorado River Basin", 7000, &owner).await?;
//!     assert!(!ledger.check_availability(2023, "Colorado River Basin", 4000).await?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`quota`]: The ledger and its record types
//! - [`replay`]: Scripted operation runs for the CLI
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;
pub mod quota;
pub mod replay;

// Re-export commonly used types
pub use config::Config;
pub use error::{AllocationError, Result};
pub use quota::{Principal, QuotaKey, QuotaLedger, QuotaRecord};
