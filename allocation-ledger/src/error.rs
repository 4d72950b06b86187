//! Error types for allocation-ledger

use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, AllocationError>;

/// Allocation ledger error types
#[derive(Error, Debug)]
pub enum AllocationError {
    /// Quota definition attempted by someone other than the owner
    #[error("Not authorized: {caller} may not define quotas")]
    NotAuthorized { caller: String },

    /// No quota has been defined for the period/region
    #[error("No allocation found for region {region} and period {period}")]
    QuotaNotFound { period: i32, region: String },

    /// Commit would push the committed amount above total capacity
    #[error("Insufficient capacity: requested {requested}, available {available}")]
    InsufficientCapacity { requested: u64, available: u64 },

    /// Release amount exceeds what is currently committed
    #[error("Cannot release {requested}: only {committed} committed")]
    ExcessiveRelease { requested: u64, committed: u64 },

    /// Input rejected by the validation settings
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Replay script parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AllocationError {
    /// Whether the caller can fix the condition and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AllocationError::NotAuthorized { .. }
                | AllocationError::QuotaNotFound { .. }
                | AllocationError::InsufficientCapacity { .. }
                | AllocationError::ExcessiveRelease { .. }
                | AllocationError::InvalidAmount(_)
        )
    }
}
