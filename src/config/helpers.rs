//! Typed parsing of `LEXDESK_*` environment overrides.
//!
//! Every helper takes an [`EnvLookup`] so resolution can be exercised
//! against a fixed map instead of the process environment.

use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::ConfigError;

pub(crate) type EnvLookup<'a> = &'a dyn Fn(&str) -> Result<String, VarError>;

pub(crate) fn process_env(key: &str) -> Result<String, VarError> {
    std::env::var(key)
}

/// Read an optional variable. Blank values count as unset.
pub(crate) fn optional_env(env: EnvLookup<'_>, key: &str) -> Result<Option<String>, ConfigError> {
    match env(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid unicode".to_string(),
        }),
    }
}

pub(crate) fn parse_bool_env(
    env: EnvLookup<'_>,
    key: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match optional_env(env, key)? {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a boolean, got '{other}'"),
            }),
        },
        None => Ok(default),
    }
}

pub(crate) fn parse_string_env(
    env: EnvLookup<'_>,
    key: &str,
    default: String,
) -> Result<String, ConfigError> {
    Ok(optional_env(env, key)?.unwrap_or(default))
}

pub(crate) fn parse_number_env<T>(env: EnvLookup<'_>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_env(env, key)? {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("'{raw}' is not a valid number: {e}"),
        }),
        None => Ok(default),
    }
}


#[cfg(test)]
mod tests {
    use super::test_env::fixed;
    use super::*;

    #[test]
    fn blank_values_are_unset() {
        let env = fixed(&[("LEXDESK_CURRENCY_SYMBOL", "   ")]);
        assert_eq!(
            optional_env(&env, "LEXDESK_CURRENCY_SYMBOL").expect("lookup"),
            None
        );
        assert_eq!(
            parse_string_env(&env, "LEXDESK_CURRENCY_SYMBOL", "$".to_string()).expect("lookup"),
            "$"
        );
    }

    #[test]
    fn booleans_accept_common_spellings() {
        let env = fixed(&[("A", "Yes"), ("B", "0"), ("C", "maybe")]);
        assert!(parse_bool_env(&env, "A", false).expect("A"));
        assert!(!parse_bool_env(&env, "B", true).expect("B"));
        assert!(parse_bool_env(&env, "MISSING", true).expect("default"));

        let err = parse_bool_env(&env, "C", false).expect_err("not a boolean");
        let ConfigError::InvalidValue { key, message } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "C");
        assert!(message.contains("maybe"), "unexpected message: {message}");
    }

    #[test]
    fn numbers_report_the_offending_key() {
        let env = fixed(&[("LEXDESK_RECENT_LIMIT", "ten")]);
        let err = parse_number_env::<usize>(&env, "LEXDESK_RECENT_LIMIT", 5)
            .expect_err("not a number");
        let ConfigError::InvalidValue { key, .. } = err else {
            panic!("expected InvalidValue");
        };
        assert_eq!(key, "LEXDESK_RECENT_LIMIT");
        assert_eq!(
            parse_number_env::<u64>(&env, "LEXDESK_TRACKER_TICK_MS", 1000).expect("default"),
            1000
        );
    }
}
