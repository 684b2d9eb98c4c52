// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin activity model for storage and queries.

use serde::{Deserialize, Serialize};

/// Canonical activity record, keyed by `activity_id`.
///
/// Optional fields serialize as `null` when the source did not carry them,
/// so aggregates never mistake a missing value for zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Garmin activity ID (also used as document ID)
    pub activity_id: i64,
    /// Activity name/title
    pub activity_name: String,
    /// Activity type key (running, cycling, lap_swimming, ...)
    pub activity_type: String,
    /// Start date/time in GMT, as delivered by Garmin
    #[serde(rename = "startTimeGMT")]
    pub start_time_gmt: String,
    /// Duration in seconds
    pub duration: f64,
    /// Distance in meters
    pub distance: f64,
    /// Calories burned (kcal)
    pub calories: f64,

    // ─── Optional details ────────────────────────────────────────
    pub start_time_local: Option<String>,
    pub moving_duration: Option<f64>,
    pub elapsed_duration: Option<f64>,
    /// Meters per second
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    #[serde(rename = "averageHR")]
    pub average_hr: Option<f64>,
    #[serde(rename = "maxHR")]
    pub max_hr: Option<f64>,
    #[serde(rename = "minHR")]
    pub min_hr: Option<f64>,
    /// Meters
    pub elevation_gain: Option<f64>,
    pub elevation_loss: Option<f64>,
    pub min_elevation: Option<f64>,
    pub max_elevation: Option<f64>,
    pub average_temperature: Option<f64>,
    pub steps: Option<i64>,
    /// Running cadence (steps/min), or swim cadence for swims
    pub average_cadence: Option<f64>,
    pub stride_length: Option<f64>,
    #[serde(rename = "vO2Max")]
    pub vo2_max: Option<f64>,
    pub training_effect: Option<f64>,
    pub anaerobic_training_effect: Option<f64>,
    pub average_power: Option<f64>,
    pub max_power: Option<f64>,
    pub location_name: Option<String>,
    /// Device name (e.g. "Forerunner 965")
    pub device_name: Option<String>,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub bmr_calories: Option<f64>,
    pub max_cadence: Option<f64>,

    // ─── Swimming ────────────────────────────────────────────────
    /// Pool length in `unit_of_pool_length` units
    pub pool_length: Option<f64>,
    /// Unit key, e.g. "meter" or "yard"
    pub unit_of_pool_length: Option<String>,
    pub number_of_active_lengths: Option<i64>,
    pub total_number_of_strokes: Option<i64>,
    pub average_strokes: Option<f64>,
    #[serde(rename = "averageSWOLF")]
    pub average_swolf: Option<f64>,
    pub average_stroke_distance: Option<f64>,

    // ─── Running ─────────────────────────────────────────────────
    /// Seconds spent climbing, descending and on the flat
    pub ascent_time: Option<f64>,
    pub descent_time: Option<f64>,
    pub flat_time: Option<f64>,

    // ─── Training ────────────────────────────────────────────────
    pub training_effect_label: Option<String>,
    pub activity_training_load: Option<f64>,
    pub moderate_intensity_minutes: Option<i64>,
    pub vigorous_intensity_minutes: Option<i64>,
    pub recovery_heart_rate: Option<f64>,
    pub direct_workout_feel: Option<i64>,
    pub direct_workout_rpe: Option<i64>,

    // ─── Metadata (`metadataDTO` on details payloads) ────────────
    pub lap_count: Option<i64>,
    pub has_splits: Option<bool>,
    pub has_chart_data: Option<bool>,
    pub elevation_corrected: Option<bool>,
    pub manual_activity: Option<bool>,
    pub personal_record: Option<bool>,
    pub favorite: Option<bool>,
}

impl Activity {
    /// Calendar date (`YYYY-MM-DD`) the activity started on, in GMT.
    pub fn start_date(&self) -> &str {
        self.start_time_gmt
            .get(..10)
            .unwrap_or(self.start_time_gmt.as_str())
    }
}
