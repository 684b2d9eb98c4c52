//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs. The
//! resulting `Config` is built once and handed to each component.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::RecordKind;
use crate::time_utils::parse_calendar_date;

/// Which document store backs an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store; nothing persists past the run.
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the staging area
    pub data_dir: PathBuf,
    /// GCP project ID
    pub gcp_project_id: String,
    pub store_backend: StoreBackend,
    /// Deadline for a single store call
    pub store_timeout: Duration,

    /// Garmin Connect API base URL
    pub garmin_base_url: String,
    /// Bearer token for Garmin Connect (download only)
    pub garmin_access_token: Option<String>,

    /// First day to download, per kind. Kinds without one are not downloaded.
    pub start_dates: BTreeMap<RecordKind, NaiveDate>,
    pub enabled_kinds: Vec<RecordKind>,
    /// Window for `update` runs, in days
    pub latest_days: u32,

    pub max_failure_samples: usize,
    pub parallel_kinds: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("mydata"),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            store_timeout: Duration::from_secs(10),
            garmin_base_url: "http://localhost:9999".to_string(),
            garmin_access_token: Some("test_token".to_string()),
            start_dates: BTreeMap::new(),
            enabled_kinds: RecordKind::ALL.to_vec(),
            latest_days: 30,
            max_failure_samples: 100,
            parallel_kinds: false,
        }
    }
}

/// Per-kind start date variables.
const START_DATE_VARS: [(RecordKind, &str); 5] = [
    (RecordKind::DailySummary, "DAILY_SUMMARY_START_DATE"),
    (RecordKind::Sleep, "SLEEP_START_DATE"),
    (RecordKind::Weight, "WEIGHT_START_DATE"),
    (RecordKind::RestingHeartRate, "RHR_START_DATE"),
    (RecordKind::Activity, "ACTIVITIES_START_DATE"),
];

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| var(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut start_dates = BTreeMap::new();
        for (kind, name) in START_DATE_VARS {
            if let Some(value) = var(name) {
                let date = parse_calendar_date(&value)
                    .ok_or_else(|| ConfigError::invalid(name, &value, "expected YYYY-MM-DD"))?;
                start_dates.insert(kind, date);
            }
        }

        let enabled_kinds = match var("FITVAULT_ENABLED_KINDS") {
            Some(list) => parse_kind_list(&list)?,
            None => RecordKind::ALL.to_vec(),
        };

        let store_backend = match var("FITVAULT_STORE").as_deref() {
            None | Some("firestore") => StoreBackend::Firestore,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::invalid(
                    "FITVAULT_STORE",
                    other,
                    "expected firestore or memory",
                ))
            }
        };

        Ok(Self {
            data_dir: var("FITVAULT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("mydata")),
            gcp_project_id: var("GCP_PROJECT_ID").unwrap_or_else(|| "local-dev".to_string()),
            store_backend,
            store_timeout: Duration::from_secs(parse_or(
                "FITVAULT_STORE_TIMEOUT_SECS",
                var("FITVAULT_STORE_TIMEOUT_SECS"),
                10,
            )?),
            garmin_base_url: var("GARMIN_BASE_URL")
                .unwrap_or_else(|| "https://connect.garmin.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            garmin_access_token: var("GARMIN_ACCESS_TOKEN"),
            start_dates,
            enabled_kinds,
            latest_days: parse_or("FITVAULT_LATEST_DAYS", var("FITVAULT_LATEST_DAYS"), 30)?,
            max_failure_samples: parse_or(
                "FITVAULT_MAX_FAILURE_SAMPLES",
                var("FITVAULT_MAX_FAILURE_SAMPLES"),
                100,
            )?,
            parallel_kinds: match var("FITVAULT_PARALLEL_KINDS") {
                Some(value) => parse_bool("FITVAULT_PARALLEL_KINDS", &value)?,
                None => false,
            },
        })
    }

    /// Token for the download path; only download needs one.
    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.garmin_access_token
            .as_deref()
            .ok_or(ConfigError::Missing("GARMIN_ACCESS_TOKEN"))
    }

    pub fn is_enabled(&self, kind: RecordKind) -> bool {
        self.enabled_kinds.contains(&kind)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| ConfigError::invalid(name, &v, "expected a non-negative integer")),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(name, value, "expected true or false")),
    }
}

fn parse_kind_list(list: &str) -> Result<Vec<RecordKind>, ConfigError> {
    let mut kinds = Vec::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: RecordKind = item
            .parse()
            .map_err(|_| ConfigError::invalid("FITVAULT_ENABLED_KINDS", item, "unknown kind"))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: &'static str) -> Self {
        ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
