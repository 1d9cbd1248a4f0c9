//! Error types for LLSD decoding and encoding.

use thiserror::Error;

/// Errors raised while reading or writing LLSD XML documents.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlsdError {
    /// The document is not UTF-8.
    #[error("LLSD document is not valid UTF-8: {message}")]
    InvalidUtf8 {
        /// Description of the encoding failure.
        message: String,
    },

    /// The XML reader rejected the document.
    #[error("malformed LLSD XML: {message}")]
    MalformedXml {
        /// Reader error message.
        message: String,
    },

    /// No `<llsd>` root element was found.
    #[error("document has no <llsd> root element")]
    MissingRoot,

    /// An element appeared where the grammar does not allow it.
    #[error("unexpected <{name}> element {context}")]
    UnexpectedElement {
        /// Element name as it appeared in the document.
        name: String,
        /// Where the element was encountered.
        context: &'static str,
    },

    /// The document ended before a container or scalar was closed.
    #[error("unexpected end of LLSD document {context}")]
    UnexpectedEof {
        /// What the decoder was reading when input ran out.
        context: &'static str,
    },

    /// A scalar element held text that does not parse as its type.
    #[error("invalid <{kind}> value '{value}': {message}")]
    InvalidScalar {
        /// Scalar element name.
        kind: &'static str,
        /// Raw text content.
        value: String,
        /// Parser error message.
        message: String,
    },

    /// A `<binary>` element declared an encoding other than base64.
    #[error("unsupported binary encoding '{encoding}'")]
    UnsupportedEncoding {
        /// Declared encoding attribute value.
        encoding: String,
    },

    /// Containers are nested deeper than the decoder accepts.
    #[error("LLSD containers nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Maximum accepted nesting depth.
        limit: usize,
    },

    /// Serialising a value failed.
    #[error("failed to write LLSD XML: {message}")]
    Write {
        /// Writer error message.
        message: String,
    },
}

impl LlsdError {
    pub(crate) fn malformed(error: impl std::fmt::Display) -> Self {
        Self::MalformedXml {
            message: error.to_string(),
        }
    }

    pub(crate) fn write(error: impl std::fmt::Display) -> Self {
        Self::Write {
            message: error.to_string(),
        }
    }

    pub(crate) fn invalid_scalar(
        kind: &'static str,
        value: &str,
        error: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidScalar {
            kind,
            value: value.to_owned(),
            message: error.to_string(),
        }
    }
}
