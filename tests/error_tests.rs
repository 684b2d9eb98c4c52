// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitvault::config::ConfigError;
use fitvault::db::StoreError;
use fitvault::error::AppError;
use fitvault::models::ImportReport;
use fitvault::services::{AbortCause, FetchError, ImportAborted};
use std::time::Duration;

#[test]
fn test_store_error_fatality() {
    assert!(StoreError::Connection("refused".to_string()).is_fatal());
    assert!(!StoreError::Timeout(Duration::from_secs(10)).is_fatal());
    assert!(!StoreError::Operation("conflict".to_string()).is_fatal());
}

#[test]
fn test_app_error_conversions() {
    let err: AppError = FetchError::Auth { status: 401 }.into();
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("HTTP 401"));

    let err: AppError = ConfigError::Missing("GARMIN_ACCESS_TOKEN").into();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("GARMIN_ACCESS_TOKEN"));

    let err: AppError = FetchError::Remote("HTTP 500".to_string()).into();
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_aborted_import_converts_with_partial_report() {
    let aborted = ImportAborted {
        report: ImportReport::new(10),
        cause: AbortCause::Store(StoreError::Connection("gone".to_string())),
    };
    let err: AppError = Box::new(aborted).into();
    assert_eq!(err.exit_code(), 4);
    assert_eq!(
        err.to_string(),
        "Import aborted: 0 imported, 0 failed, run aborted: Store connection unusable: gone"
    );
}
