// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Day-keyed wellness records: daily summaries, sleep, weight and
//! resting heart rate.

use serde::{Deserialize, Serialize};

/// Daily activity summary, one per calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// Calendar date (`YYYY-MM-DD`), also the document ID
    pub calendar_date: String,
    pub total_steps: i64,
    /// Meters
    pub total_distance: f64,
    /// kcal
    pub active_calories: f64,
    pub total_calories: f64,
    /// bpm
    pub resting_heart_rate: i64,
    pub sleep_time_seconds: i64,

    pub bmr_calories: Option<f64>,
    pub min_heart_rate: Option<i64>,
    pub max_heart_rate: Option<i64>,
    pub moderate_intensity_minutes: Option<i64>,
    pub vigorous_intensity_minutes: Option<i64>,
    pub floors_ascended: Option<f64>,
    pub floors_descended: Option<f64>,
    pub steps_goal: Option<i64>,
    pub active_time_seconds: Option<f64>,
    pub sedentary_time_seconds: Option<f64>,
    pub stress_level: Option<i64>,
    pub body_battery_highest: Option<i64>,
    pub body_battery_lowest: Option<i64>,
}

/// One night of sleep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sleep {
    /// Calendar date the sleep is attributed to by Garmin
    pub calendar_date: String,
    pub sleep_time_seconds: i64,
    pub deep_sleep_seconds: i64,
    pub light_sleep_seconds: i64,
    pub rem_sleep_seconds: i64,
    pub awake_sleep_seconds: i64,

    /// Epoch milliseconds
    #[serde(rename = "sleepStartTimestampGMT")]
    pub sleep_start_timestamp_gmt: Option<i64>,
    #[serde(rename = "sleepEndTimestampGMT")]
    pub sleep_end_timestamp_gmt: Option<i64>,
    #[serde(rename = "averageSpO2Value")]
    pub average_spo2: Option<f64>,
    #[serde(rename = "lowestSpO2Value")]
    pub lowest_spo2: Option<f64>,
    pub average_respiration_value: Option<f64>,
    pub average_heart_rate: Option<f64>,
}

/// A weigh-in. Keyed by date: a later same-day weigh-in replaces an
/// earlier one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weight {
    /// Calendar date (`YYYY-MM-DD`)
    pub date: String,
    /// Kilograms
    pub weight: f64,
    pub bmi: f64,
    /// Percent
    pub body_fat: f64,

    /// Epoch milliseconds of the weigh-in
    #[serde(rename = "timestampGMT")]
    pub timestamp_gmt: Option<i64>,
    pub body_water: Option<f64>,
    pub bone_mass: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub source_type: Option<String>,
}

/// Resting heart rate for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestingHeartRate {
    pub calendar_date: String,
    /// bpm
    pub resting_heart_rate: i64,
}
