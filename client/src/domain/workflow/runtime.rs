//! Default runtime collaborators for the workflow.

use std::ops::Range;

use rand::Rng;

use crate::domain::Username;
use crate::domain::ports::UsernameGenerator;

/// Default username prefix.
pub const DEFAULT_USERNAME_PREFIX: &str = "benny";
/// Default half-open range for the numeric suffix.
pub const DEFAULT_USERNAME_SUFFIXES: Range<u32> = 100..10_000;

/// Errors raised when configuring [`RandomUsernameGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameGeneratorError {
    /// The suffix range contains no values.
    #[error("username suffix range {start}..{end} is empty")]
    EmptySuffixRange {
        /// Inclusive lower bound.
        start: u32,
        /// Exclusive upper bound.
        end: u32,
    },
}

/// Username generator drawing a uniform random suffix from a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomUsernameGenerator {
    prefix: String,
    suffixes: Range<u32>,
}

impl RandomUsernameGenerator {
    /// Build a generator for `prefix` and the half-open `suffixes` range.
    ///
    /// # Errors
    ///
    /// Returns [`UsernameGeneratorError::EmptySuffixRange`] when the range is
    /// empty.
    pub fn new(
        prefix: impl Into<String>,
        suffixes: Range<u32>,
    ) -> Result<Self, UsernameGeneratorError> {
        if suffixes.is_empty() {
            return Err(UsernameGeneratorError::EmptySuffixRange {
                start: suffixes.start,
                end: suffixes.end,
            });
        }
        Ok(Self {
            prefix: prefix.into(),
            suffixes,
        })
    }

    /// Username prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for RandomUsernameGenerator {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_USERNAME_PREFIX.to_owned(),
            suffixes: DEFAULT_USERNAME_SUFFIXES,
        }
    }
}

impl UsernameGenerator for RandomUsernameGenerator {
    fn generate(&self) -> Username {
        let suffix = rand::thread_rng().gen_range(self.suffixes.clone());
        Username::new(self.prefix.as_str(), suffix)
    }
}
