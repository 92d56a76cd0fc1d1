use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{PlannerError, PlannerResult};
use crate::models::settings::PlannerSettings;

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Yaml,
}

impl SettingsFormat {
    pub fn from_path(path: &Path) -> PlannerResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => Err(PlannerError::config(format!(
                "unsupported settings file {}",
                path.display()
            ))),
        }
    }
}

/// Reads and validates planner settings from a `.json`, `.yaml` or `.yml` file.
pub fn load_settings(path: impl AsRef<Path>) -> PlannerResult<PlannerSettings> {
    let path = path.as_ref();
    let format = SettingsFormat::from_path(path)?;
    let raw = std::fs::read_to_string(path)?;
    let settings = parse_settings(&raw, format)?;
    debug!(target: "planner::settings", path = %path.display(), "settings loaded");
    Ok(settings)
}

pub fn parse_settings(raw: &str, format: SettingsFormat) -> PlannerResult<PlannerSettings> {
    let settings: PlannerSettings = match format {
        SettingsFormat::Json => serde_json::from_str(raw)?,
        SettingsFormat::Yaml => serde_yaml::from_str(raw)?,
    };
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn validate_settings(settings: &PlannerSettings) -> PlannerResult<()> {
    for (field, value) in [
        ("workdayStartMinute", settings.workday_start_minute),
        ("workdayEndMinute", settings.workday_end_minute),
    ] {
        if value > MINUTES_PER_DAY {
            return Err(PlannerError::validation_with_details(
                format!("{field} must be between 0 and {MINUTES_PER_DAY}"),
                json!({ "field": field, "value": value }),
            ));
        }
    }
    Ok(())
}

/// Local wall-clock time for `timezone`. Unknown or missing names fall back to UTC.
pub fn local_now(clock: DateTime<Utc>, timezone: Option<&str>) -> NaiveDateTime {
    let Some(name) = timezone else {
        return clock.naive_utc();
    };
    match name.parse::<Tz>() {
        Ok(tz) => clock.with_timezone(&tz).naive_local(),
        Err(_) => {
            warn!(target: "planner::settings", timezone = %name, "unknown timezone, using UTC");
            clock.naive_utc()
        }
    }
}
