//! Operator credentials supplied once per run.

use std::fmt;

use zeroize::Zeroizing;

/// Validation errors for [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialsError {
    /// The first name was blank.
    #[error("first name must not be empty")]
    EmptyFirstName,
    /// The last name was blank.
    #[error("last name must not be empty")]
    EmptyLastName,
    /// The password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// First name, last name, and password of the operator account.
///
/// ## Invariants
/// - Names are trimmed and non-empty.
/// - The password is non-empty and wiped from memory on drop.
///
/// # Examples
/// ```
/// use registration_client::domain::Credentials;
///
/// let credentials = Credentials::try_from_parts(" Ada ", "Linden", "secret")?;
/// assert_eq!(credentials.first_name(), "Ada");
/// assert!(!format!("{credentials:?}").contains("secret"));
/// # Ok::<(), registration_client::domain::CredentialsError>(())
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    first_name: String,
    last_name: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Validate and build credentials.
    ///
    /// # Errors
    ///
    /// Returns a [`CredentialsError`] naming the first blank field.
    pub fn try_from_parts(
        first_name: impl AsRef<str>,
        last_name: impl AsRef<str>,
        password: impl Into<String>,
    ) -> Result<Self, CredentialsError> {
        let first = first_name.as_ref().trim();
        if first.is_empty() {
            return Err(CredentialsError::EmptyFirstName);
        }
        let last = last_name.as_ref().trim();
        if last.is_empty() {
            return Err(CredentialsError::EmptyLastName);
        }
        let secret = Zeroizing::new(password.into());
        if secret.is_empty() {
            return Err(CredentialsError::EmptyPassword);
        }
        Ok(Self {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            password: secret,
        })
    }

    /// Account first name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Account last name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Account password.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"<redacted>")
            .finish()
    }
}
