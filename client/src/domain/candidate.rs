//! Usernames and the registration candidate threaded through the name check
//! and account creation steps.

use std::fmt;

use chrono::NaiveDate;
use llsd::LlsdMap;
use zeroize::Zeroizing;

use super::RegistrationWorkflowConfig;

/// Generated username in `prefix + digits` form.
///
/// # Examples
/// ```
/// use registration_client::domain::Username;
///
/// let username = Username::new("benny", 4821);
/// assert_eq!(username.as_str(), "benny4821");
/// assert!(Username::matches_format(username.as_str(), "benny"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username {
    prefix: String,
    suffix: u32,
    rendered: String,
}

impl Username {
    /// Build a username from its prefix and numeric suffix.
    pub fn new(prefix: impl Into<String>, suffix: u32) -> Self {
        let prefix_text = prefix.into();
        let rendered = format!("{prefix_text}{suffix}");
        Self {
            prefix: prefix_text,
            suffix,
            rendered,
        }
    }

    /// Full username text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.rendered
    }

    /// Fixed prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Numeric suffix.
    #[must_use]
    pub const fn suffix(&self) -> u32 {
        self.suffix
    }

    /// Return true when `candidate` is `prefix` followed by one or more ASCII
    /// digits.
    #[must_use]
    pub fn matches_format(candidate: &str, prefix: &str) -> bool {
        candidate
            .strip_prefix(prefix)
            .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

/// Account fields added once the name is known to be free.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountDetails {
    /// Contact address derived from the username.
    pub email: String,
    /// Placeholder account password.
    pub password: Zeroizing<String>,
    /// Placeholder date of birth.
    pub date_of_birth: NaiveDate,
    /// Optional region the new account starts in.
    pub start_region_name: Option<String>,
}

impl AccountDetails {
    /// Derive account details for `username` from the workflow configuration.
    ///
    /// # Examples
    /// ```
    /// use registration_client::domain::{AccountDetails, RegistrationWorkflowConfig, Username};
    ///
    /// let details = AccountDetails::derive(
    ///     &Username::new("benny", 4821),
    ///     &RegistrationWorkflowConfig::default(),
    /// );
    /// assert_eq!(details.email, "benny4821@ben.com");
    /// ```
    #[must_use]
    pub fn derive(username: &Username, config: &RegistrationWorkflowConfig) -> Self {
        Self {
            email: format!("{username}@{}", config.email_domain),
            password: config.account_password.clone(),
            date_of_birth: config.date_of_birth,
            start_region_name: config.start_region_name.clone(),
        }
    }
}

impl fmt::Debug for AccountDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountDetails")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("date_of_birth", &self.date_of_birth)
            .field("start_region_name", &self.start_region_name)
            .finish()
    }
}

/// Errors raised by [`RegistrationCandidate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    /// Account details were attached twice.
    #[error("account details are already attached to '{username}'")]
    AccountAlreadyAttached {
        /// Username of the candidate.
        username: String,
    },
    /// The create-user payload was requested before account details existed.
    #[error("account details have not been attached to '{username}'")]
    AccountMissing {
        /// Username of the candidate.
        username: String,
    },
}

/// Accumulator for the name check and account creation payloads.
///
/// ## Invariants
/// - Fields are only ever added. The username and last name identifier are
///   fixed at construction; account details can be attached once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationCandidate {
    username: Username,
    last_name_id: String,
    account: Option<AccountDetails>,
}

impl RegistrationCandidate {
    /// Start a candidate for `username` under last name `last_name_id`.
    pub fn new(username: Username, last_name_id: impl Into<String>) -> Self {
        Self {
            username,
            last_name_id: last_name_id.into(),
            account: None,
        }
    }

    /// Candidate username.
    #[must_use]
    pub const fn username(&self) -> &Username {
        &self.username
    }

    /// Chosen last name identifier.
    #[must_use]
    pub fn last_name_id(&self) -> &str {
        &self.last_name_id
    }

    /// Attached account details, if any.
    #[must_use]
    pub const fn account(&self) -> Option<&AccountDetails> {
        self.account.as_ref()
    }

    /// Attach account details.
    ///
    /// # Errors
    ///
    /// Returns [`CandidateError::AccountAlreadyAttached`] on a second call; the
    /// first details are kept.
    pub fn attach_account(&mut self, details: AccountDetails) -> Result<(), CandidateError> {
        if self.account.is_some() {
            return Err(CandidateError::AccountAlreadyAttached {
                username: self.username.to_string(),
            });
        }
        self.account = Some(details);
        Ok(())
    }

    /// Payload for the `check_name` capability.
    #[must_use]
    pub fn check_name_payload(&self) -> LlsdMap {
        let mut payload = LlsdMap::new();
        payload.insert("username", self.username.as_str());
        payload.insert("last_name_id", self.last_name_id.as_str());
        payload
    }

    /// Payload for the `create_user` capability.
    ///
    /// # Errors
    ///
    /// Returns [`CandidateError::AccountMissing`] before account details are
    /// attached.
    pub fn create_user_payload(&self) -> Result<LlsdMap, CandidateError> {
        let account = self
            .account
            .as_ref()
            .ok_or_else(|| CandidateError::AccountMissing {
                username: self.username.to_string(),
            })?;

        let mut payload = self.check_name_payload();
        payload.insert("email", account.email.as_str());
        payload.insert("password", account.password.as_str());
        payload.insert("dob", account.date_of_birth.format("%Y-%m-%d").to_string());
        if let Some(region) = &account.start_region_name {
            payload.insert("start_region_name", region.as_str());
        }
        Ok(payload)
    }
}
