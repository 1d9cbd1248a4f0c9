//! Driven port supplying candidate usernames.

use crate::domain::Username;

/// Source of candidate usernames for the name check.
#[cfg_attr(test, mockall::automock)]
pub trait UsernameGenerator: Send + Sync {
    /// Produce a fresh username in `prefix + digits` form.
    fn generate(&self) -> Username;
}
