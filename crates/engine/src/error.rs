//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`EntryOutOfRange`] thrown when a ledger row index does not exist.
//! - [`InvalidMonth`] thrown when a period string is neither `YYYY-MM` nor a
//!   pt-BR month label.
//! - [`LegacyShape`] thrown when a parallel-array record has mismatched
//!   lengths.
//!
//! Bad numeric input is never an error: amounts fall back to zero.
//!
//!  [`EntryOutOfRange`]: EngineError::EntryOutOfRange
//!  [`InvalidMonth`]: EngineError::InvalidMonth
//!  [`LegacyShape`]: EngineError::LegacyShape
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("entry {index} out of range (ledger has {len} entries)")]
    EntryOutOfRange { index: usize, len: usize },
    #[error("Invalid field: {0}")]
    InvalidField(String),
    #[error("Invalid month: {0}")]
    InvalidMonth(String),
    #[error("Invalid legacy record: {0}")]
    LegacyShape(String),
    #[error("Export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::EntryOutOfRange { index: a, len: la },
                Self::EntryOutOfRange { index: b, len: lb },
            ) => a == b && la == lb,
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::InvalidMonth(a), Self::InvalidMonth(b)) => a == b,
            (Self::LegacyShape(a), Self::LegacyShape(b)) => a == b,
            (Self::Export(a), Self::Export(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
