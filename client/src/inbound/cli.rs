//! Command-line arguments for a registration run.

use std::fmt;

use clap::Parser;
use zeroize::Zeroizing;

use crate::domain::{Credentials, CredentialsError};

/// `registration-client` command arguments.
#[derive(Clone, Parser)]
#[command(
    name = "registration-client",
    about = "Register a new account through the capability-gated registration API",
    version
)]
pub struct CliArgs {
    /// First name of the registering operator.
    #[arg(value_name = "first")]
    pub first_name: String,
    /// Last name of the registering operator.
    #[arg(value_name = "last")]
    pub last_name: String,
    /// Password of the registering operator.
    #[arg(value_name = "password")]
    pub password: String,
}

impl CliArgs {
    /// Label used when reporting to the operator, `"First Last"`.
    #[must_use]
    pub fn account_label(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// Validate the arguments into credentials.
    ///
    /// The password copy held by the arguments is wiped.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError`] when any part is empty.
    pub fn into_credentials(self) -> Result<Credentials, CredentialsError> {
        let password = Zeroizing::new(self.password);
        Credentials::try_from_parts(&self.first_name, &self.last_name, password.as_str())
    }
}

impl fmt::Debug for CliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliArgs")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Argument parsing and validation.

    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("registration-client").chain(args.iter().copied()))
    }

    #[test]
    fn three_positionals_become_credentials() {
        let args = parse(&["Ada", "Linden", "hunter2"]).expect("arguments parse");
        assert_eq!(args.account_label(), "Ada Linden");

        let credentials = args.into_credentials().expect("credentials are valid");
        assert_eq!(credentials.first_name(), "Ada");
        assert_eq!(credentials.last_name(), "Linden");
        assert_eq!(credentials.password(), "hunter2");
    }

    #[rstest]
    #[case::none(&[])]
    #[case::two(&["Ada", "Linden"])]
    #[case::four(&["Ada", "Linden", "hunter2", "extra"])]
    fn wrong_arity_is_a_usage_error(#[case] args: &[&str]) {
        let err = parse(args).expect_err("arity is wrong");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn blank_names_are_rejected() {
        let args = parse(&["  ", "Linden", "hunter2"]).expect("arguments parse");
        assert_eq!(
            args.into_credentials().expect_err("blank first name"),
            CredentialsError::EmptyFirstName
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let args = parse(&["Ada", "Linden", "hunter2"]).expect("arguments parse");
        assert!(!format!("{args:?}").contains("hunter2"));
    }
}
