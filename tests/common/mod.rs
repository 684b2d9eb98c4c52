// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use fitvault::db::{FirestoreStore, MemoryStore};
use fitvault::models::RecordKind;
use fitvault::services::ImportEngine;
use fitvault::staging::StagingStore;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_store() -> FirestoreStore {
    FirestoreStore::new("test-project", Duration::from_secs(10))
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_store_offline() -> FirestoreStore {
    FirestoreStore::new_mock()
}

/// Staging area in a fresh temporary directory. Keep the `TempDir` alive.
#[allow(dead_code)]
pub fn temp_staging() -> (TempDir, StagingStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let staging = StagingStore::new(dir.path());
    (dir, staging)
}

/// Engine over a fresh in-memory store; the returned store shares its data.
#[allow(dead_code)]
pub fn memory_engine(staging: &StagingStore) -> (ImportEngine<MemoryStore>, MemoryStore) {
    let store = MemoryStore::new();
    (ImportEngine::new(store.clone(), staging.clone()), store)
}

/// Write one staged file.
#[allow(dead_code)]
pub async fn stage(staging: &StagingStore, kind: RecordKind, key: &str, payload: Value) {
    staging
        .write(kind, key, &payload)
        .await
        .expect("Failed to write staged file");
}

/// Write raw bytes as a staged file, bypassing JSON encoding.
#[allow(dead_code)]
pub fn stage_raw(staging: &StagingStore, kind: RecordKind, key: &str, content: &str) {
    let dir = staging.kind_dir(kind);
    std::fs::create_dir_all(&dir).expect("Failed to create kind dir");
    std::fs::write(dir.join(format!("{key}.json")), content).expect("Failed to write file");
}

// ─── Payload fixtures (Garmin field names) ─────────────────────

#[allow(dead_code)]
pub fn activity_summary(id: i64, start: &str) -> Value {
    json!({
        "activityId": id,
        "activityName": "Morning Run",
        "activityType": {"typeKey": "running", "typeId": 1},
        "startTimeGMT": start,
        "startTimeLocal": start,
        "duration": 1800.0,
        "distance": 5000.0,
        "calories": 320.0,
        "averageHR": 148.0,
        "maxHR": 171.0,
        "elevationGain": 42.0
    })
}

#[allow(dead_code)]
pub fn activity_details(id: i64, start: &str) -> Value {
    json!({
        "activityId": id,
        "activityName": "Morning Run",
        "activityTypeDTO": {"typeKey": "running", "typeId": 1},
        "locationName": "Palo Alto",
        "summaryDTO": {
            "startTimeGMT": start,
            "startTimeLocal": start,
            "duration": 1800.0,
            "distance": 5000.0,
            "calories": 320.0,
            "averageHR": 148.0,
            "maxHR": 171.0,
            "elevationGain": 42.0
        }
    })
}

#[allow(dead_code)]
pub fn sleep(date: &str) -> Value {
    json!({
        "calendarDate": date,
        "sleepTimeSeconds": 27000,
        "deepSleepSeconds": 5400,
        "lightSleepSeconds": 14400,
        "remSleepSeconds": 5400,
        "awakeSleepSeconds": 1800,
        "averageSpO2Value": 95.0
    })
}

#[allow(dead_code)]
pub fn weight(date: &str, kg: f64) -> Value {
    json!({
        "calendarDate": date,
        "weight": kg,
        "bmi": 22.4,
        "bodyFat": 18.5
    })
}

#[allow(dead_code)]
pub fn resting_heart_rate(date: &str, bpm: i64) -> Value {
    json!({"calendarDate": date, "restingHeartRate": bpm})
}

#[allow(dead_code)]
pub fn daily_summary(date: &str) -> Value {
    json!({
        "calendarDate": date,
        "totalSteps": 10234,
        "totalDistanceMeters": 7800,
        "activeKilocalories": 450.0,
        "totalKilocalories": 2300.0,
        "restingHeartRate": 50,
        "sleepTimeInSeconds": 26000
    })
}
