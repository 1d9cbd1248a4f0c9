//! Driven ports used by the registration workflow.

mod macros;
pub(crate) use macros::define_port_error;

mod payload_codec;
mod registration_reporter;
mod registration_transport;
mod username_generator;

#[cfg(test)]
pub use payload_codec::MockPayloadCodec;
pub use payload_codec::{PayloadCodec, PayloadCodecError};
pub use registration_reporter::{RegistrationReporter, StepReport};
#[cfg(test)]
pub use registration_transport::MockRegistrationTransport;
pub use registration_transport::{OutboundBody, RegistrationTransport, RegistrationTransportError};
#[cfg(test)]
pub use username_generator::MockUsernameGenerator;
pub use username_generator::UsernameGenerator;
