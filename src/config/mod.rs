//! Runtime configuration.
//!
//! `Settings` (file or defaults) is the base layer; `LEXDESK_*` environment
//! variables override it field by field.

mod helpers;
mod practice;

pub use practice::PracticeConfig;

use crate::config::helpers::{EnvLookup, parse_bool_env, parse_string_env, process_env};
use crate::error::ConfigError;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    pub json: bool,
}

impl LoggingConfig {
    pub(crate) fn resolve(settings: &Settings, env: EnvLookup<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            level: parse_string_env(env, "LEXDESK_LOG_LEVEL", settings.logging.level.clone())?,
            json: parse_bool_env(env, "LEXDESK_LOG_JSON", settings.logging.json)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub practice: PracticeConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Resolve against the process environment.
    pub fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve_with(settings, &process_env)
    }

    pub(crate) fn resolve_with(
        settings: &Settings,
        env: EnvLookup<'_>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            practice: PracticeConfig::resolve(settings, env)?,
            logging: LoggingConfig::resolve(settings, env)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::helpers::test_env::fixed;

    #[test]
    fn logging_env_overrides_settings() {
        let env = fixed(&[("LEXDESK_LOG_LEVEL", "lexdesk=debug"), ("LEXDESK_LOG_JSON", "1")]);
        let config = Config::resolve_with(&Settings::default(), &env).expect("config");
        assert_eq!(config.logging.level, "lexdesk=debug");
        assert!(config.logging.json);
    }
}
