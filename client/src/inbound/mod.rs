//! Inbound adapters translating operator input into domain values.
//!
//! The command line is the only inbound surface.

pub mod cli;
