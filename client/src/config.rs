//! Registration client configuration loaded via OrthoConfig.
//!
//! Every field is optional; accessors fall back to the built-in defaults so
//! an empty environment yields a working configuration.

use std::ops::Range;
use std::time::Duration;

use chrono::NaiveDate;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::domain::{
    DEFAULT_ACCOUNT_PASSWORD, DEFAULT_DISCOVERY_URL, DEFAULT_EMAIL_DOMAIN,
    DEFAULT_USERNAME_PREFIX, DEFAULT_USERNAME_SUFFIXES, RandomUsernameGenerator,
    RegistrationWorkflowConfig, UsernameGeneratorError,
};

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DATE_OF_BIRTH_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while turning settings into runtime values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The date of birth is not a `YYYY-MM-DD` date.
    #[error("invalid date of birth '{value}': {message}")]
    InvalidDateOfBirth {
        /// Configured text.
        value: String,
        /// Parser message.
        message: String,
    },
    /// The discovery URL is blank.
    #[error("discovery url must not be empty")]
    EmptyDiscoveryUrl,
    /// The request timeout is zero.
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
    /// The username suffix bounds describe an empty range.
    #[error(transparent)]
    Usernames(#[from] UsernameGeneratorError),
}

/// Settings for one registration run.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REGISTRATION")]
pub struct RegistrationSettings {
    /// Capability discovery endpoint.
    pub discovery_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Override for the `User-Agent` header.
    pub user_agent: Option<String>,
    /// Prefix of generated usernames.
    pub username_prefix: Option<String>,
    /// Inclusive lower bound of the username suffix.
    pub username_suffix_min: Option<u32>,
    /// Exclusive upper bound of the username suffix.
    pub username_suffix_max: Option<u32>,
    /// Domain of derived email addresses.
    pub email_domain: Option<String>,
    /// Password given to created accounts.
    pub account_password: Option<String>,
    /// Date of birth given to created accounts, as `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    /// Region created accounts start in.
    pub start_region_name: Option<String>,
    /// Emit JSON log lines instead of plain text.
    #[ortho_config(default = false)]
    pub log_json: bool,
}

impl RegistrationSettings {
    /// Return the discovery URL, falling back to the default.
    pub fn discovery_url(&self) -> &str {
        self.discovery_url
            .as_deref()
            .unwrap_or(DEFAULT_DISCOVERY_URL)
    }

    /// Return the request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroTimeout`] when configured as zero.
    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        match self.request_timeout_secs {
            Some(0) => Err(ConfigError::ZeroTimeout),
            Some(secs) => Ok(Duration::from_secs(secs)),
            None => Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }

    /// Return the username prefix, falling back to the default.
    pub fn username_prefix(&self) -> &str {
        self.username_prefix
            .as_deref()
            .unwrap_or(DEFAULT_USERNAME_PREFIX)
    }

    /// Return the half-open username suffix range.
    pub fn username_suffixes(&self) -> Range<u32> {
        let start = self
            .username_suffix_min
            .unwrap_or(DEFAULT_USERNAME_SUFFIXES.start);
        let end = self
            .username_suffix_max
            .unwrap_or(DEFAULT_USERNAME_SUFFIXES.end);
        start..end
    }

    /// Return the email domain, falling back to the default.
    pub fn email_domain(&self) -> &str {
        self.email_domain.as_deref().unwrap_or(DEFAULT_EMAIL_DOMAIN)
    }

    /// Parse the configured date of birth, falling back to 1980-01-01.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDateOfBirth`] for unparsable text.
    pub fn date_of_birth(&self) -> Result<NaiveDate, ConfigError> {
        let Some(text) = self.date_of_birth.as_deref() else {
            return Ok(RegistrationWorkflowConfig::default_date_of_birth());
        };
        NaiveDate::parse_from_str(text.trim(), DATE_OF_BIRTH_FORMAT).map_err(|err| {
            ConfigError::InvalidDateOfBirth {
                value: text.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// Build the username generator described by these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Usernames`] when the suffix range is empty.
    pub fn username_generator(&self) -> Result<RandomUsernameGenerator, ConfigError> {
        Ok(RandomUsernameGenerator::new(self.username_prefix(), self.username_suffixes())?)
    }

    /// Build the workflow configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a blank discovery URL, an unparsable
    /// date, or an empty username suffix range.
    pub fn to_workflow_config(&self) -> Result<RegistrationWorkflowConfig, ConfigError> {
        if self.discovery_url().trim().is_empty() {
            return Err(ConfigError::EmptyDiscoveryUrl);
        }
        self.username_generator()?;
        let account_password = self
            .account_password
            .clone()
            .unwrap_or_else(|| DEFAULT_ACCOUNT_PASSWORD.to_owned());
        Ok(RegistrationWorkflowConfig {
            discovery_url: self.discovery_url().trim().to_owned(),
            email_domain: self.email_domain().to_owned(),
            account_password: Zeroizing::new(account_password),
            date_of_birth: self.date_of_birth()?,
            start_region_name: self
                .start_region_name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for registration settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 11] = [
        "REGISTRATION_DISCOVERY_URL",
        "REGISTRATION_REQUEST_TIMEOUT_SECS",
        "REGISTRATION_USER_AGENT",
        "REGISTRATION_USERNAME_PREFIX",
        "REGISTRATION_USERNAME_SUFFIX_MIN",
        "REGISTRATION_USERNAME_SUFFIX_MAX",
        "REGISTRATION_EMAIL_DOMAIN",
        "REGISTRATION_ACCOUNT_PASSWORD",
        "REGISTRATION_DATE_OF_BIRTH",
        "REGISTRATION_START_REGION_NAME",
        "REGISTRATION_LOG_JSON",
    ];

    fn cleared_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    fn load_from_empty_args() -> RegistrationSettings {
        RegistrationSettings::load_from_iter([OsString::from("registration-client")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(cleared_with(&[]));

        let settings = load_from_empty_args();
        assert!(!settings.log_json);
        assert_eq!(settings.discovery_url(), DEFAULT_DISCOVERY_URL);
        assert_eq!(
            settings.request_timeout(),
            Ok(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        );
        assert_eq!(settings.username_suffixes(), DEFAULT_USERNAME_SUFFIXES);

        let config = settings.to_workflow_config().expect("defaults are valid");
        assert_eq!(config, RegistrationWorkflowConfig::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("REGISTRATION_DISCOVERY_URL", "http://127.0.0.1:9000/caps"),
            ("REGISTRATION_REQUEST_TIMEOUT_SECS", "5"),
            ("REGISTRATION_USERNAME_PREFIX", "tester"),
            ("REGISTRATION_USERNAME_SUFFIX_MIN", "10"),
            ("REGISTRATION_USERNAME_SUFFIX_MAX", "20"),
            ("REGISTRATION_EMAIL_DOMAIN", "example.org"),
            ("REGISTRATION_DATE_OF_BIRTH", "1990-06-15"),
            ("REGISTRATION_START_REGION_NAME", "Ahern"),
            ("REGISTRATION_LOG_JSON", "true"),
        ]));

        let settings = load_from_empty_args();
        assert!(settings.log_json);
        assert_eq!(settings.request_timeout(), Ok(Duration::from_secs(5)));
        assert_eq!(settings.username_suffixes(), 10..20);
        let generator = settings.username_generator().expect("range is valid");
        assert_eq!(generator.prefix(), "tester");

        let config = settings.to_workflow_config().expect("overrides are valid");
        assert_eq!(config.discovery_url, "http://127.0.0.1:9000/caps");
        assert_eq!(config.email_domain, "example.org");
        assert_eq!(
            config.date_of_birth,
            NaiveDate::from_ymd_opt(1990, 6, 15).expect("valid date")
        );
        assert_eq!(config.start_region_name.as_deref(), Some("Ahern"));
    }

    fn empty_settings() -> RegistrationSettings {
        RegistrationSettings {
            discovery_url: None,
            request_timeout_secs: None,
            user_agent: None,
            username_prefix: None,
            username_suffix_min: None,
            username_suffix_max: None,
            email_domain: None,
            account_password: None,
            date_of_birth: None,
            start_region_name: None,
            log_json: false,
        }
    }

    #[rstest]
    fn blank_discovery_url_is_rejected() {
        let settings = RegistrationSettings {
            discovery_url: Some("   ".to_owned()),
            ..empty_settings()
        };
        assert_eq!(
            settings.to_workflow_config(),
            Err(ConfigError::EmptyDiscoveryUrl)
        );
    }

    #[rstest]
    fn unparsable_date_of_birth_is_rejected() {
        let settings = RegistrationSettings {
            date_of_birth: Some("yesterday".to_owned()),
            ..empty_settings()
        };
        assert!(matches!(
            settings.to_workflow_config(),
            Err(ConfigError::InvalidDateOfBirth { value, .. }) if value == "yesterday"
        ));
    }

    #[rstest]
    #[case::equal(50, 50)]
    #[case::inverted(200, 100)]
    fn empty_suffix_range_is_rejected(#[case] min: u32, #[case] max: u32) {
        let settings = RegistrationSettings {
            username_suffix_min: Some(min),
            username_suffix_max: Some(max),
            ..empty_settings()
        };
        assert_eq!(
            settings.to_workflow_config(),
            Err(ConfigError::Usernames(UsernameGeneratorError::EmptySuffixRange {
                start: min,
                end: max,
            }))
        );
    }

    #[rstest]
    fn zero_timeout_is_rejected() {
        let settings = RegistrationSettings {
            request_timeout_secs: Some(0),
            ..empty_settings()
        };
        assert_eq!(settings.request_timeout(), Err(ConfigError::ZeroTimeout));
    }
}
