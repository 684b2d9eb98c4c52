// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitvault::models::RecordKind;
use fitvault::staging::StagingError;
use serde_json::json;

mod common;
use common::{stage, stage_raw, temp_staging};

#[tokio::test]
async fn test_layout_per_kind_directory() {
    let (dir, staging) = temp_staging();
    stage(&staging, RecordKind::RestingHeartRate, "2024-01-01", json!({"value": 50})).await;
    stage(&staging, RecordKind::DailySummary, "2024-01-01", json!({"totalSteps": 1})).await;

    assert!(dir.path().join("rhr/2024-01-01.json").is_file());
    assert!(dir.path().join("daily_summary/2024-01-01.json").is_file());
    assert!(staging.list(RecordKind::Sleep).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_ignores_other_files() {
    let (_dir, staging) = temp_staging();
    stage(&staging, RecordKind::Activity, "42_summary", json!({"activityId": 42})).await;
    let kind_dir = staging.kind_dir(RecordKind::Activity);
    std::fs::write(kind_dir.join("42.fit"), b"binary").unwrap();
    std::fs::write(kind_dir.join(".43_summary.json.tmp"), b"{").unwrap();

    let files = staging.list(RecordKind::Activity).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].key, "42_summary");
    assert_eq!(files[0].kind, RecordKind::Activity);
}

#[tokio::test]
async fn test_read_round_trips_payload() {
    let (_dir, staging) = temp_staging();
    let payload = json!({"dailySleepDTO": {"calendarDate": "2024-01-01", "sleepTimeSeconds": 100}});
    stage(&staging, RecordKind::Sleep, "2024-01-01", payload.clone()).await;

    let files = staging.list(RecordKind::Sleep).await.unwrap();
    assert_eq!(staging.read(&files[0]).await.unwrap(), payload);
}

#[tokio::test]
async fn test_parse_error_names_file() {
    let (_dir, staging) = temp_staging();
    stage_raw(&staging, RecordKind::Sleep, "2024-01-01", "");

    let files = staging.list(RecordKind::Sleep).await.unwrap();
    let err = staging.read(&files[0]).await.unwrap_err();
    assert!(matches!(err, StagingError::Parse { .. }));
    assert!(err.to_string().contains("2024-01-01.json"));
}

#[tokio::test]
async fn test_list_on_file_instead_of_dir_is_fatal() {
    let (dir, staging) = temp_staging();
    std::fs::write(dir.path().join("weight"), b"oops").unwrap();

    let err = staging.list(RecordKind::Weight).await.unwrap_err();
    assert!(err.is_fatal());
}
