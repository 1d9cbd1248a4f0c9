//! HTTP outbound adapters.

mod reqwest_transport;

pub use reqwest_transport::{HttpTransportIdentity, ReqwestRegistrationTransport};
