//! Declares the error enums of the driven ports.
//!
//! [`RegistrationTransportError`](super::RegistrationTransportError) and
//! [`PayloadCodecError`](super::PayloadCodecError) are both generated here.
//! Each variant gets a `thiserror` message and a snake-case constructor
//! taking `impl Into<_>` fields, so adapters can write
//! `RegistrationTransportError::status(503_u16, "busy")` without spelling
//! out the struct literal.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] error.")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            #[doc = concat!("Build a [`Self::", stringify!($variant), "`] error.")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $(
                    #[doc = concat!("`", stringify!($field), "` detail.")]
                    $field : $ty
                ),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructors generated for the transport and codec errors.

    use crate::domain::ports::{PayloadCodecError, RegistrationTransportError};

    #[test]
    fn string_fields_accept_borrowed_text() {
        let error = RegistrationTransportError::transport("connection reset");
        assert_eq!(
            error,
            RegistrationTransportError::Transport {
                message: "connection reset".to_owned(),
            }
        );
        assert_eq!(
            error.to_string(),
            "registration transport failed: connection reset"
        );
    }

    #[test]
    fn numeric_fields_keep_their_type() {
        let error = RegistrationTransportError::status(503_u16, "busy");
        assert_eq!(
            error.to_string(),
            "registration service returned status 503: busy"
        );
    }

    #[test]
    fn multi_word_variants_become_snake_case() {
        let error = RegistrationTransportError::invalid_url("not a url", "relative URL");
        assert_eq!(
            error.to_string(),
            "invalid capability url 'not a url': relative URL"
        );
    }

    #[test]
    fn codec_errors_share_the_generated_shape() {
        assert_eq!(
            PayloadCodecError::decode("missing root").to_string(),
            "payload decoding failed: missing root"
        );
    }
}
