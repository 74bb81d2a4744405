use std::path::PathBuf;
use std::time::Duration;

use crate::config::helpers::{
    EnvLookup, optional_env, parse_bool_env, parse_number_env, parse_string_env,
};
use crate::error::ConfigError;
use crate::practice::DashboardLimits;
use crate::settings::Settings;

/// Resolved engine and reporting options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeConfig {
    pub snapshot_path: Option<PathBuf>,
    pub limits: DashboardLimits,
    pub include_zero_document_types: bool,
    pub currency_symbol: String,
    pub tracker_tick: Duration,
}

fn require_positive<T: PartialOrd + Default>(key: &str, value: T) -> Result<T, ConfigError> {
    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

impl PracticeConfig {
    pub(crate) fn resolve(settings: &Settings, env: EnvLookup<'_>) -> Result<Self, ConfigError> {
        let practice = &settings.practice;

        let snapshot_path = optional_env(env, "LEXDESK_SNAPSHOT")?
            .map(PathBuf::from)
            .or_else(|| practice.snapshot_path.clone());

        let recent_matters = require_positive(
            "LEXDESK_RECENT_LIMIT",
            parse_number_env(env, "LEXDESK_RECENT_LIMIT", practice.recent_limit)?,
        )?;
        let upcoming_hearings = require_positive(
            "LEXDESK_UPCOMING_LIMIT",
            parse_number_env(env, "LEXDESK_UPCOMING_LIMIT", practice.upcoming_limit)?,
        )?;
        let tick_ms = require_positive(
            "LEXDESK_TRACKER_TICK_MS",
            parse_number_env(env, "LEXDESK_TRACKER_TICK_MS", practice.tracker_tick_ms)?,
        )?;

        Ok(Self {
            snapshot_path,
            limits: DashboardLimits {
                recent_matters,
                upcoming_hearings,
            },
            include_zero_document_types: parse_bool_env(
                env,
                "LEXDESK_INCLUDE_ZERO_DOCUMENT_TYPES",
                practice.include_zero_document_types,
            )?,
            currency_symbol: parse_string_env(
                env,
                "LEXDESK_CURRENCY_SYMBOL",
                practice.currency_symbol.clone(),
            )?,
            tracker_tick: Duration::from_millis(tick_ms),
        })
    }
}
