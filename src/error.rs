use thiserror::Error;

/// Errors surfaced by storage, configuration and lookups.
///
/// Network-facing failures are deliberately absent: a failed probe collapses
/// to [`crate::status::DeviceStatus::Unreachable`] and a failed SNMP read to
/// [`crate::snmp::SnmpValue::Unavailable`].
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Equipment not found: {0}")]
    EquipmentNotFound(i32),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
