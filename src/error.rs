// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error type for the command-line entry points.

use crate::config::ConfigError;
use crate::db::StoreError;
use crate::services::garmin::FetchError;
use crate::services::import::ImportAborted;
use crate::staging::StagingError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Garmin API error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    #[error("Import aborted: {0}")]
    Aborted(#[from] Box<ImportAborted>),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::BadRequest(_) => 2,
            AppError::Fetch(FetchError::Auth { .. }) => 3,
            AppError::Aborted(_) => 4,
            _ => 1,
        }
    }
}

impl From<ImportAborted> for AppError {
    fn from(aborted: ImportAborted) -> Self {
        AppError::Aborted(Box::new(aborted))
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Config(ConfigError::Missing("X")).exit_code(), 2);
        assert_eq!(AppError::BadRequest("bad".into()).exit_code(), 2);
        assert_eq!(
            AppError::Database(StoreError::Operation("x".into())).exit_code(),
            1
        );
    }
}
