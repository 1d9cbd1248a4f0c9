//! Outbound adapters implementing the domain ports.

mod console_reporter;
pub mod http;
mod llsd_codec;

pub use console_reporter::ConsoleReporter;
pub use llsd_codec::LlsdXmlCodec;
