//! Capability names and the per-run capability directory.
//!
//! The directory is built once from the discovery response and only read
//! afterwards. A missing capability is an ordinary state that the workflow
//! branches on.

use std::collections::BTreeMap;
use std::fmt;

use llsd::LlsdValue;

/// Capabilities the registration workflow knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Fetch the table of service error codes.
    GetErrorCodes,
    /// Fetch the catalogue of last names open for registration.
    GetLastNames,
    /// Ask whether a username and last name pair is free.
    CheckName,
    /// Create the account.
    CreateUser,
}

impl Capability {
    /// Every known capability in workflow order.
    pub const ALL: [Self; 4] = [
        Self::GetErrorCodes,
        Self::GetLastNames,
        Self::CheckName,
        Self::CreateUser,
    ];

    /// Name used as the directory key on the wire.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::GetErrorCodes => "get_error_codes",
            Self::GetLastNames => "get_last_names",
            Self::CheckName => "check_name",
            Self::CreateUser => "create_user",
        }
    }

    /// Look up a known capability by wire name.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.wire_name() == name)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Errors raised by [`CapabilityDirectory`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityDirectoryError {
    /// The requested capability was not granted.
    #[error("capability '{name}' is not present")]
    NotPresent {
        /// Wire name of the missing capability.
        name: String,
    },
    /// The discovery response did not have the directory shape.
    #[error("capability directory is malformed: {message}")]
    Malformed {
        /// What was wrong with the decoded value.
        message: String,
    },
}

/// Mapping from capability name to URL, fetched once per run.
///
/// Names outside [`Capability`] are kept so they can be reported. A key with an
/// empty URL is present.
///
/// # Examples
/// ```
/// use registration_client::domain::{Capability, CapabilityDirectory};
///
/// let directory: CapabilityDirectory =
///     [("check_name", "https://cap.example/check")].into_iter().collect();
/// assert!(directory.has(Capability::CheckName));
/// assert!(!directory.has(Capability::CreateUser));
/// assert_eq!(directory.url_for(Capability::CheckName)?, "https://cap.example/check");
/// # Ok::<(), registration_client::domain::CapabilityDirectoryError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityDirectory {
    urls: BTreeMap<String, String>,
}

impl CapabilityDirectory {
    /// Build a directory from a decoded discovery response.
    ///
    /// The value must be a map whose entries are `string` or `uri` scalars.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDirectoryError::Malformed`] for any other shape.
    pub fn from_llsd(value: &LlsdValue) -> Result<Self, CapabilityDirectoryError> {
        let map = value
            .as_map()
            .ok_or_else(|| CapabilityDirectoryError::Malformed {
                message: format!("expected a map, found {}", value.type_name()),
            })?;

        let mut urls = BTreeMap::new();
        for (name, entry) in map.iter() {
            let url = entry
                .as_str()
                .ok_or_else(|| CapabilityDirectoryError::Malformed {
                    message: format!(
                        "capability '{name}' should be a string or uri, found {}",
                        entry.type_name()
                    ),
                })?;
            urls.insert(name.to_owned(), url.to_owned());
        }
        Ok(Self { urls })
    }

    /// Return true when `capability` was granted.
    #[must_use]
    pub fn has(&self, capability: Capability) -> bool {
        self.has_named(capability.wire_name())
    }

    /// Return true when a capability called `name` was granted.
    #[must_use]
    pub fn has_named(&self, name: &str) -> bool {
        self.urls.contains_key(name)
    }

    /// Resolve the URL of `capability`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityDirectoryError::NotPresent`] when it was not granted.
    pub fn url_for(&self, capability: Capability) -> Result<&str, CapabilityDirectoryError> {
        self.urls
            .get(capability.wire_name())
            .map(String::as_str)
            .ok_or_else(|| CapabilityDirectoryError::NotPresent {
                name: capability.wire_name().to_owned(),
            })
    }

    /// Iterate over `(name, url)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.urls
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }

    /// Number of granted capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Return true when nothing was granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for CapabilityDirectory
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            urls: iter
                .into_iter()
                .map(|(name, url)| (name.into(), url.into()))
                .collect(),
        }
    }
}
