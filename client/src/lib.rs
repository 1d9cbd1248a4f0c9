//! Registration client library modules.
//!
//! The domain drives a capability-gated registration workflow through ports;
//! outbound adapters speak HTTP and LLSD XML; the inbound adapter parses the
//! command line.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
