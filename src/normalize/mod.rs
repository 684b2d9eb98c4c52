// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record normalizer.
//!
//! Maps one raw Garmin payload of a declared kind to a [`CanonicalRecord`].
//! Garmin returns the same data in two layouts:
//! - summary: fields at the top level (list endpoints, stripped downloads)
//! - details: fields nested under a per-kind wrapper such as `summaryDTO`
//!
//! The layout is detected per payload, so a directory may mix both.
//! Normalization is pure: no I/O, and the input is never modified.

pub mod fields;

use serde_json::Value;

use crate::models::{
    Activity, CanonicalRecord, DailySummary, RecordKind, RestingHeartRate, Sleep, Weight,
};
use crate::time_utils;
use fields::{Extracted, Extractor, FieldSource};

/// Key reported when a rejected payload has no usable natural key.
pub const UNKNOWN_KEY: &str = "unknown";

/// Payload layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Summary,
    Details,
}

/// A payload rejected for missing or malformed required fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {natural_key}: missing or malformed {}", .missing.join(", "))]
pub struct ValidationFailure {
    pub kind: RecordKind,
    /// Natural key if it could be read, otherwise `"unknown"`.
    pub natural_key: String,
    pub missing: Vec<&'static str>,
}

/// Detect whether `raw` carries its fields under the kind's details wrapper.
pub fn detect_shape(kind: RecordKind, raw: &Value) -> Shape {
    match raw.get(kind.details_wrapper()) {
        Some(Value::Object(_)) => Shape::Details,
        _ => Shape::Summary,
    }
}

fn field_source(kind: RecordKind, raw: &Value) -> FieldSource<'_> {
    let top = raw.as_object();
    match (top, top.and_then(|t| t.get(kind.details_wrapper()))) {
        (Some(envelope), Some(Value::Object(wrapper))) => FieldSource::details(wrapper, envelope),
        _ => FieldSource::summary(top),
    }
}

// Raw field names, canonical name first, then Garmin's spellings.
const TOTAL_STEPS: &[&str] = &["totalSteps"];
const TOTAL_DISTANCE: &[&str] = &["totalDistance", "totalDistanceMeters"];
const ACTIVE_CALORIES: &[&str] = &["activeCalories", "activeKilocalories"];
const TOTAL_CALORIES: &[&str] = &["totalCalories", "totalKilocalories"];
const RESTING_HR: &[&str] = &["restingHeartRate", "value"];
const DAILY_SLEEP_SECONDS: &[&str] = &["sleepTimeSeconds", "sleepTimeInSeconds"];
const SLEEP_SECONDS: &[&str] = &["sleepTimeSeconds"];
const DEEP_SLEEP: &[&str] = &["deepSleepSeconds"];
const LIGHT_SLEEP: &[&str] = &["lightSleepSeconds"];
const REM_SLEEP: &[&str] = &["remSleepSeconds"];
const AWAKE_SLEEP: &[&str] = &["awakeSleepSeconds"];
const WEIGHT: &[&str] = &["weight"];
const BMI: &[&str] = &["bmi"];
const BODY_FAT: &[&str] = &["bodyFat"];
const ACTIVITY_NAME: &[&str] = &["activityName"];
const ACTIVITY_TYPE: &[&str] = &["activityType"];
const START_TIME_GMT: &[&str] = &["startTimeGMT"];
const DURATION: &[&str] = &["duration"];
const DISTANCE: &[&str] = &["distance"];
const CALORIES: &[&str] = &["calories"];

/// Required non-key fields per kind. A payload where all of them are blank
/// is a "no data" placeholder rather than a broken record.
fn measurement_fields(kind: RecordKind) -> &'static [&'static [&'static str]] {
    match kind {
        RecordKind::DailySummary => &[
            TOTAL_STEPS,
            TOTAL_DISTANCE,
            ACTIVE_CALORIES,
            TOTAL_CALORIES,
            RESTING_HR,
            DAILY_SLEEP_SECONDS,
        ],
        RecordKind::Activity => &[
            ACTIVITY_NAME,
            ACTIVITY_TYPE,
            START_TIME_GMT,
            DURATION,
            DISTANCE,
            CALORIES,
        ],
        RecordKind::Sleep => &[
            SLEEP_SECONDS,
            DEEP_SLEEP,
            LIGHT_SLEEP,
            REM_SLEEP,
            AWAKE_SLEEP,
        ],
        RecordKind::Weight => &[WEIGHT, BMI, BODY_FAT],
        RecordKind::RestingHeartRate => &[RESTING_HR],
    }
}

/// True for payloads Garmin returns on days without data: `null`, `{}`, a
/// `null` details wrapper, or an object whose measurements are all blank.
pub fn is_empty_payload(kind: RecordKind, raw: &Value) -> bool {
    match raw {
        Value::Null => true,
        Value::Object(map) if map.is_empty() => true,
        Value::Object(map) if matches!(map.get(kind.details_wrapper()), Some(Value::Null)) => true,
        Value::Object(_) => {
            let source = field_source(kind, raw);
            measurement_fields(kind)
                .iter()
                .all(|names| source.is_blank(names))
        }
        _ => false,
    }
}

/// Normalize one raw payload into a canonical record of `kind`.
pub fn normalize(kind: RecordKind, raw: &Value) -> Result<CanonicalRecord, ValidationFailure> {
    let source = field_source(kind, raw);
    match kind {
        RecordKind::DailySummary => normalize_daily_summary(source).map(CanonicalRecord::DailySummary),
        RecordKind::Activity => normalize_activity(source).map(CanonicalRecord::Activity),
        RecordKind::Sleep => normalize_sleep(source).map(CanonicalRecord::Sleep),
        RecordKind::Weight => normalize_weight(source).map(CanonicalRecord::Weight),
        RecordKind::RestingHeartRate => {
            normalize_resting_heart_rate(source).map(CanonicalRecord::RestingHeartRate)
        }
    }
}

fn reject(kind: RecordKind, key: Option<String>, ex: Extractor<'_>) -> ValidationFailure {
    ValidationFailure {
        kind,
        natural_key: key.unwrap_or_else(|| UNKNOWN_KEY.to_string()),
        missing: ex.into_missing(),
    }
}

/// Natural key for the day-keyed kinds.
fn calendar_date_key(source: FieldSource<'_>) -> Extracted<String> {
    fields::date(source.lookup(&["calendarDate"]))
}

fn normalize_daily_summary(source: FieldSource<'_>) -> Result<DailySummary, ValidationFailure> {
    let mut ex = Extractor::new(source);
    let key = calendar_date_key(source);
    let key_text = key.clone().ok();
    let calendar_date = ex.require("calendarDate", key);

    let total_steps = ex.integer("totalSteps", TOTAL_STEPS);
    let total_distance = ex.number("totalDistance", TOTAL_DISTANCE);
    let active_calories = ex.number("activeCalories", ACTIVE_CALORIES);
    let total_calories = ex.number("totalCalories", TOTAL_CALORIES);
    let resting_heart_rate = ex.integer("restingHeartRate", RESTING_HR);
    let sleep_time_seconds = ex.integer("sleepTimeSeconds", DAILY_SLEEP_SECONDS);

    if !ex.missing().is_empty() {
        return Err(reject(RecordKind::DailySummary, key_text, ex));
    }

    Ok(DailySummary {
        calendar_date,
        total_steps,
        total_distance,
        active_calories,
        total_calories,
        resting_heart_rate,
        sleep_time_seconds,
        bmr_calories: ex.opt_number(&["bmrCalories", "bmrKilocalories"]),
        min_heart_rate: ex.opt_integer(&["minHeartRate"]),
        max_heart_rate: ex.opt_integer(&["maxHeartRate"]),
        moderate_intensity_minutes: ex.opt_integer(&["moderateIntensityMinutes"]),
        vigorous_intensity_minutes: ex.opt_integer(&["vigorousIntensityMinutes"]),
        floors_ascended: ex.opt_number(&["floorsAscended"]),
        floors_descended: ex.opt_number(&["floorsDescended"]),
        steps_goal: ex.opt_integer(&["stepsGoal", "dailyStepGoal"]),
        active_time_seconds: ex.opt_number(&["activeTimeSeconds", "activeTimeInSeconds"]),
        sedentary_time_seconds: ex.opt_number(&["sedentaryTimeSeconds", "sedentaryTimeInSeconds"]),
        stress_level: ex.opt_integer(&["stressLevel", "averageStressLevel"]),
        body_battery_highest: ex.opt_integer(&["bodyBatteryHighest", "bodyBatteryHighestValue"]),
        body_battery_lowest: ex.opt_integer(&["bodyBatteryLowest", "bodyBatteryLowestValue"]),
    })
}

/// `activityType` is either a type key string or an object with `typeKey`;
/// details payloads may instead carry `activityTypeDTO`.
fn activity_type(source: FieldSource<'_>) -> Extracted<String> {
    let from_value = |value: &Value| fields::keyed_text(Some(value), "typeKey");

    match source.lookup(&["activityType"]).map(from_value) {
        Some(Extracted::Present(key)) => Extracted::Present(key),
        found => match source.lookup(&["activityTypeDTO"]).map(from_value) {
            Some(Extracted::Present(key)) => Extracted::Present(key),
            _ => found.unwrap_or(Extracted::Absent),
        },
    }
}

/// Flags such as `lapCount` or `manualActivity`. Details payloads nest them
/// under `metadataDTO`; list summaries carry them at the top level.
fn activity_metadata(source: FieldSource<'_>) -> FieldSource<'_> {
    match source.lookup(&["metadataDTO"]) {
        Some(Value::Object(metadata)) => FieldSource::summary(Some(metadata)),
        _ => source,
    }
}

fn normalize_activity(source: FieldSource<'_>) -> Result<Activity, ValidationFailure> {
    let mut ex = Extractor::new(source);
    let key = fields::integer(source.lookup(&["activityId"]));
    let key_text = key.clone().ok().map(|id| id.to_string());
    let activity_id = ex.require("activityId", key);

    let activity_name = ex.text("activityName", ACTIVITY_NAME);
    let activity_type = ex.require("activityType", activity_type(source));
    let start_time_gmt = ex.datetime("startTimeGMT", START_TIME_GMT);
    let duration = ex.number("duration", DURATION);
    let distance = ex.number("distance", DISTANCE);
    let calories = ex.number("calories", CALORIES);

    if !ex.missing().is_empty() {
        return Err(reject(RecordKind::Activity, key_text, ex));
    }

    let metadata = activity_metadata(source);

    Ok(Activity {
        activity_id,
        activity_name,
        activity_type,
        start_time_gmt,
        duration,
        distance,
        calories,
        start_time_local: ex.opt_datetime(&["startTimeLocal"]),
        moving_duration: ex.opt_number(&["movingDuration"]),
        elapsed_duration: ex.opt_number(&["elapsedDuration"]),
        average_speed: ex.opt_number(&["averageSpeed"]),
        max_speed: ex.opt_number(&["maxSpeed"]),
        average_hr: ex.opt_number(&["averageHR"]),
        max_hr: ex.opt_number(&["maxHR"]),
        min_hr: ex.opt_number(&["minHR"]),
        elevation_gain: ex.opt_number(&["elevationGain"]),
        elevation_loss: ex.opt_number(&["elevationLoss"]),
        min_elevation: ex.opt_number(&["minElevation"]),
        max_elevation: ex.opt_number(&["maxElevation"]),
        average_temperature: ex.opt_number(&["averageTemperature"]),
        steps: ex.opt_integer(&["steps"]),
        average_cadence: ex.opt_number(&[
            "averageCadence",
            "averageRunningCadenceInStepsPerMinute",
            "averageSwimCadence",
        ]),
        stride_length: ex.opt_number(&["strideLength", "averageStrideLength"]),
        vo2_max: ex.opt_number(&["vO2Max", "vO2MaxValue"]),
        training_effect: ex.opt_number(&["trainingEffect", "aerobicTrainingEffect"]),
        anaerobic_training_effect: ex.opt_number(&["anaerobicTrainingEffect"]),
        average_power: ex.opt_number(&["averagePower", "avgPower"]),
        max_power: ex.opt_number(&["maxPower"]),
        location_name: ex.opt_text(&["locationName"]),
        device_name: ex.opt_text(&["deviceName"]),
        start_latitude: ex.opt_number(&["startLatitude"]),
        start_longitude: ex.opt_number(&["startLongitude"]),
        end_latitude: ex.opt_number(&["endLatitude"]),
        end_longitude: ex.opt_number(&["endLongitude"]),
        bmr_calories: ex.opt_number(&["bmrCalories"]),
        max_cadence: ex.opt_number(&["maxCadence", "maxRunningCadenceInStepsPerMinute"]),
        pool_length: ex.opt_number(&["poolLength"]),
        unit_of_pool_length: ex.opt_keyed_text(&["unitOfPoolLength"], "unitKey"),
        number_of_active_lengths: ex.opt_integer(&["numberOfActiveLengths"]),
        total_number_of_strokes: ex.opt_integer(&["totalNumberOfStrokes"]),
        average_strokes: ex.opt_number(&["averageStrokes"]),
        average_swolf: ex.opt_number(&["averageSWOLF"]),
        average_stroke_distance: ex.opt_number(&["averageStrokeDistance"]),
        ascent_time: ex.opt_number(&["ascentTime"]),
        descent_time: ex.opt_number(&["descentTime"]),
        flat_time: ex.opt_number(&["flatTime"]),
        training_effect_label: ex.opt_text(&["trainingEffectLabel"]),
        activity_training_load: ex.opt_number(&["activityTrainingLoad"]),
        moderate_intensity_minutes: ex.opt_integer(&["moderateIntensityMinutes"]),
        vigorous_intensity_minutes: ex.opt_integer(&["vigorousIntensityMinutes"]),
        recovery_heart_rate: ex.opt_number(&["recoveryHeartRate"]),
        direct_workout_feel: ex.opt_integer(&["directWorkoutFeel"]),
        direct_workout_rpe: ex.opt_integer(&["directWorkoutRpe"]),
        lap_count: fields::integer(metadata.lookup(&["lapCount"])).ok(),
        has_splits: fields::boolean(metadata.lookup(&["hasSplits"])).ok(),
        has_chart_data: fields::boolean(metadata.lookup(&["hasChartData"])).ok(),
        elevation_corrected: fields::boolean(metadata.lookup(&["elevationCorrected"])).ok(),
        manual_activity: fields::boolean(metadata.lookup(&["manualActivity"])).ok(),
        personal_record: fields::boolean(metadata.lookup(&["personalRecord", "pr"])).ok(),
        favorite: fields::boolean(metadata.lookup(&["favorite"])).ok(),
    })
}

fn normalize_sleep(source: FieldSource<'_>) -> Result<Sleep, ValidationFailure> {
    let mut ex = Extractor::new(source);
    let key = calendar_date_key(source);
    let key_text = key.clone().ok();
    let calendar_date = ex.require("calendarDate", key);

    let sleep_time_seconds = ex.integer("sleepTimeSeconds", SLEEP_SECONDS);
    let deep_sleep_seconds = ex.integer("deepSleepSeconds", DEEP_SLEEP);
    let light_sleep_seconds = ex.integer("lightSleepSeconds", LIGHT_SLEEP);
    let rem_sleep_seconds = ex.integer("remSleepSeconds", REM_SLEEP);
    let awake_sleep_seconds = ex.integer("awakeSleepSeconds", AWAKE_SLEEP);

    if !ex.missing().is_empty() {
        return Err(reject(RecordKind::Sleep, key_text, ex));
    }

    Ok(Sleep {
        calendar_date,
        sleep_time_seconds,
        deep_sleep_seconds,
        light_sleep_seconds,
        rem_sleep_seconds,
        awake_sleep_seconds,
        sleep_start_timestamp_gmt: ex.opt_integer(&["sleepStartTimestampGMT"]),
        sleep_end_timestamp_gmt: ex.opt_integer(&["sleepEndTimestampGMT"]),
        average_spo2: ex.opt_number(&["averageSpO2Value"]),
        lowest_spo2: ex.opt_number(&["lowestSpO2Value"]),
        average_respiration_value: ex.opt_number(&["averageRespirationValue"]),
        average_heart_rate: ex.opt_number(&["averageHeartRate", "avgHeartRate"]),
    })
}

/// Weigh-in date: `calendarDate`, else `date` as either a `YYYY-MM-DD`
/// string or Garmin's epoch-milliseconds timestamp (UTC).
fn weight_date(source: FieldSource<'_>) -> Extracted<String> {
    if let Extracted::Present(date) = calendar_date_key(source) {
        return Extracted::Present(date);
    }

    match source.lookup(&["date"]) {
        None => calendar_date_key(source),
        Some(value) if value.is_string() => fields::date(Some(value)),
        Some(value) => match fields::integer(Some(value)) {
            Extracted::Present(millis) => time_utils::date_from_epoch_millis(millis)
                .map_or(Extracted::Malformed, Extracted::Present),
            _ => Extracted::Malformed,
        },
    }
}

fn normalize_weight(source: FieldSource<'_>) -> Result<Weight, ValidationFailure> {
    let mut ex = Extractor::new(source);
    let key = weight_date(source);
    let key_text = key.clone().ok();
    let date = ex.require("date", key);

    let weight = ex.number("weight", WEIGHT);
    let bmi = ex.number("bmi", BMI);
    let body_fat = ex.number("bodyFat", BODY_FAT);

    if !ex.missing().is_empty() {
        return Err(reject(RecordKind::Weight, key_text, ex));
    }

    Ok(Weight {
        date,
        weight,
        bmi,
        body_fat,
        timestamp_gmt: ex.opt_integer(&["timestampGMT", "date"]),
        body_water: ex.opt_number(&["bodyWater"]),
        bone_mass: ex.opt_number(&["boneMass"]),
        muscle_mass: ex.opt_number(&["muscleMass"]),
        source_type: ex.opt_text(&["sourceType"]),
    })
}

fn normalize_resting_heart_rate(
    source: FieldSource<'_>,
) -> Result<RestingHeartRate, ValidationFailure> {
    let mut ex = Extractor::new(source);
    let key = calendar_date_key(source);
    let key_text = key.clone().ok();
    let calendar_date = ex.require("calendarDate", key);
    let resting_heart_rate = ex.integer("restingHeartRate", RESTING_HR);

    if !ex.missing().is_empty() {
        return Err(reject(RecordKind::RestingHeartRate, key_text, ex));
    }

    Ok(RestingHeartRate {
        calendar_date,
        resting_heart_rate,
    })
}

/// Split a staged file's parsed content into individual payloads.
///
/// A JSON array is a list of payloads; an object holding the kind's list
/// container (`dateWeightList`) is that list; anything else is one payload.
pub fn split_payloads(kind: RecordKind, content: Value) -> Vec<Value> {
    match content {
        Value::Array(items) => items,
        Value::Object(mut map) => match kind.list_container() {
            Some(container) if matches!(map.get(container), Some(Value::Array(_))) => {
                match map.remove(container) {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                }
            }
            _ => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity_summary() -> Value {
        json!({
            "activityId": 42,
            "activityName": "Run",
            "activityType": {"typeKey": "running", "typeId": 1},
            "startTimeGMT": "2024-01-01 06:00:00",
            "duration": 1800.0,
            "distance": 5000.0,
            "calories": 300.0,
            "averageHR": 151.0,
            "averageRunningCadenceInStepsPerMinute": 172.0
        })
    }

    #[test]
    fn test_detect_shape() {
        assert_eq!(detect_shape(RecordKind::Activity, &activity_summary()), Shape::Summary);
        let details = json!({"activityId": 1, "summaryDTO": {"distance": 1.0}});
        assert_eq!(detect_shape(RecordKind::Activity, &details), Shape::Details);
        // A wrapper for another kind does not count.
        assert_eq!(detect_shape(RecordKind::Sleep, &details), Shape::Summary);
        // Nor does a non-object wrapper.
        let odd = json!({"summaryDTO": "n/a"});
        assert_eq!(detect_shape(RecordKind::Activity, &odd), Shape::Summary);
    }

    #[test]
    fn test_activity_from_summary_shape() {
        let record = normalize(RecordKind::Activity, &activity_summary()).unwrap();
        let CanonicalRecord::Activity(activity) = record else {
            panic!("expected activity");
        };
        assert_eq!(activity.activity_id, 42);
        assert_eq!(activity.activity_type, "running");
        assert_eq!(activity.average_hr, Some(151.0));
        assert_eq!(activity.average_cadence, Some(172.0));
        assert_eq!(activity.max_hr, None);
        assert_eq!(activity.start_date(), "2024-01-01");
    }

    #[test]
    fn test_activity_details_with_envelope_identity() {
        let raw = json!({
            "activityId": 99,
            "activityName": "Evening Ride",
            "activityTypeDTO": {"typeKey": "cycling"},
            "summaryDTO": {
                "startTimeGMT": "2024-05-02T18:00:00.0",
                "duration": "3600",
                "distance": "25000.5",
                "calories": 640,
                "maxHR": null
            }
        });
        let CanonicalRecord::Activity(activity) = normalize(RecordKind::Activity, &raw).unwrap()
        else {
            panic!("expected activity");
        };
        assert_eq!(activity.activity_id, 99);
        assert_eq!(activity.activity_type, "cycling");
        assert_eq!(activity.distance, 25000.5);
        assert_eq!(activity.duration, 3600.0);
        assert_eq!(activity.max_hr, None);
    }

    #[test]
    fn test_missing_key_reports_unknown() {
        let mut raw = activity_summary();
        raw.as_object_mut().unwrap().remove("activityId");
        let err = normalize(RecordKind::Activity, &raw).unwrap_err();
        assert_eq!(err.natural_key, UNKNOWN_KEY);
        assert_eq!(err.missing, vec!["activityId"]);
    }

    #[test]
    fn test_failure_names_all_missing_fields() {
        let raw = json!({"activityId": "17", "activityName": "x", "distance": "far"});
        let err = normalize(RecordKind::Activity, &raw).unwrap_err();
        assert_eq!(err.natural_key, "17");
        assert_eq!(
            err.missing,
            vec!["activityType", "startTimeGMT", "duration", "distance", "calories"]
        );
        assert!(err.to_string().contains("Activity 17"));
    }

    #[test]
    fn test_daily_summary_aliases() {
        let raw = json!({
            "calendarDate": "2024-01-02",
            "totalSteps": 12034,
            "totalDistanceMeters": 9120,
            "activeKilocalories": 512.0,
            "totalKilocalories": 2410.0,
            "restingHeartRate": 49,
            "sleepTimeInSeconds": 27000,
            "dailyStepGoal": 10000,
            "averageStressLevel": null
        });
        let CanonicalRecord::DailySummary(day) = normalize(RecordKind::DailySummary, &raw).unwrap()
        else {
            panic!("expected daily summary");
        };
        assert_eq!(day.total_distance, 9120.0);
        assert_eq!(day.sleep_time_seconds, 27000);
        assert_eq!(day.steps_goal, Some(10000));
        assert_eq!(day.stress_level, None);
    }

    #[test]
    fn test_weight_date_from_epoch_millis() {
        let raw = json!({
            "date": 1_709_278_200_000_i64,
            "weight": 71.5,
            "bmi": "22.1",
            "bodyFat": 18.2
        });
        let CanonicalRecord::Weight(weight) = normalize(RecordKind::Weight, &raw).unwrap() else {
            panic!("expected weight");
        };
        assert_eq!(weight.date, "2024-03-01");
        assert_eq!(weight.timestamp_gmt, Some(1_709_278_200_000));
        assert_eq!(weight.bmi, 22.1);
    }

    #[test]
    fn test_weight_prefers_calendar_date() {
        let raw = json!({
            "calendarDate": "2024-02-29",
            "date": 1_709_278_200_000_i64,
            "weight": 71.5,
            "bmi": 22.1,
            "bodyFat": 18.2
        });
        let record = normalize(RecordKind::Weight, &raw).unwrap();
        assert_eq!(record.natural_key(), "2024-02-29");
    }

    #[test]
    fn test_resting_heart_rate_value_alias() {
        let raw = json!({"calendarDate": "2024-01-05", "value": 52.0});
        let record = normalize(RecordKind::RestingHeartRate, &raw).unwrap();
        assert_eq!(
            record,
            CanonicalRecord::RestingHeartRate(RestingHeartRate {
                calendar_date: "2024-01-05".to_string(),
                resting_heart_rate: 52,
            })
        );
    }

    #[test]
    fn test_sleep_details_wrapper() {
        let raw = json!({
            "dailySleepDTO": {
                "calendarDate": "2024-01-03",
                "sleepTimeSeconds": 25200,
                "deepSleepSeconds": 5400,
                "lightSleepSeconds": 14400,
                "remSleepSeconds": 4800,
                "awakeSleepSeconds": 600,
                "averageSpO2Value": 95.0
            },
            "sleepLevels": []
        });
        let CanonicalRecord::Sleep(sleep) = normalize(RecordKind::Sleep, &raw).unwrap() else {
            panic!("expected sleep");
        };
        assert_eq!(sleep.deep_sleep_seconds, 5400);
        assert_eq!(sleep.average_spo2, Some(95.0));
        assert_eq!(sleep.lowest_spo2, None);
    }

    #[test]
    fn test_empty_payloads() {
        assert!(is_empty_payload(RecordKind::Sleep, &Value::Null));
        assert!(is_empty_payload(RecordKind::Sleep, &json!({})));
        assert!(is_empty_payload(RecordKind::Sleep, &json!({"dailySleepDTO": null})));
        assert!(is_empty_payload(
            RecordKind::RestingHeartRate,
            &json!({"calendarDate": "2024-01-01", "restingHeartRate": null})
        ));
        assert!(!is_empty_payload(RecordKind::Activity, &activity_summary()));
        assert!(!is_empty_payload(RecordKind::Activity, &json!("garbage")));
    }

    #[test]
    fn test_normalize_does_not_touch_input() {
        let raw = activity_summary();
        let before = raw.clone();
        let _ = normalize(RecordKind::Activity, &raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_split_payloads() {
        let list = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(split_payloads(RecordKind::Activity, list).len(), 2);

        let range = json!({"startDate": "2024-01-01", "dateWeightList": [{"a": 1}, {"a": 2}, {"a": 3}]});
        assert_eq!(split_payloads(RecordKind::Weight, range).len(), 3);

        let single = json!({"dateWeightList": "none", "weight": 70});
        assert_eq!(split_payloads(RecordKind::Weight, single).len(), 1);
    }
}
