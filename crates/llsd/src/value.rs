//! LLSD value model.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::LlsdMap;

/// One LLSD value.
///
/// `Real` holds an `f64`, so the type implements `PartialEq` but not `Eq`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LlsdValue {
    /// Explicitly undefined value (`<undef/>`).
    #[default]
    Undef,
    /// Boolean scalar.
    Boolean(bool),
    /// Signed 32-bit integer scalar.
    Integer(i32),
    /// Double-precision real scalar.
    Real(f64),
    /// UTF-8 string scalar.
    String(String),
    /// UUID scalar.
    Uuid(Uuid),
    /// UTC timestamp scalar.
    Date(DateTime<Utc>),
    /// URI scalar, kept as text.
    Uri(String),
    /// Binary blob.
    Binary(Vec<u8>),
    /// Ordered sequence of values.
    Array(Vec<LlsdValue>),
    /// Insertion-ordered string-keyed map.
    Map(LlsdMap),
}

impl LlsdValue {
    /// Element name used for this value in LLSD XML.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Undef => "undef",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Uuid(_) => "uuid",
            Self::Date(_) => "date",
            Self::Uri(_) => "uri",
            Self::Binary(_) => "binary",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }

    /// Borrow the text of a `string` or `uri` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(text) | Self::Uri(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Return the value of a `boolean`.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(flag) => Some(*flag),
            _ => None,
        }
    }

    /// Return the value of an `integer`.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(number) => Some(*number),
            _ => None,
        }
    }

    /// Borrow the entries of an `array`.
    #[must_use]
    pub fn as_array(&self) -> Option<&[LlsdValue]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Borrow the entries of a `map`.
    #[must_use]
    pub const fn as_map(&self) -> Option<&LlsdMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Consume the value, returning the map when it is one.
    ///
    /// # Errors
    ///
    /// Returns the original value unchanged when it is not a map.
    pub fn into_map(self) -> Result<LlsdMap, Self> {
        match self {
            Self::Map(map) => Ok(map),
            other => Err(other),
        }
    }

    /// Consume the value, returning the items when it is an array.
    ///
    /// # Errors
    ///
    /// Returns the original value unchanged when it is not an array.
    pub fn into_array(self) -> Result<Vec<Self>, Self> {
        match self {
            Self::Array(items) => Ok(items),
            other => Err(other),
        }
    }

    /// Render a scalar as display text; containers and binary yield `None`.
    ///
    /// # Examples
    /// ```
    /// use llsd::LlsdValue;
    ///
    /// assert_eq!(LlsdValue::Integer(42).scalar_text().as_deref(), Some("42"));
    /// assert_eq!(LlsdValue::Array(Vec::new()).scalar_text(), None);
    /// ```
    #[must_use]
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Boolean(flag) => Some(flag.to_string()),
            Self::Integer(number) => Some(number.to_string()),
            Self::Real(number) => Some(number.to_string()),
            Self::String(text) | Self::Uri(text) => Some(text.clone()),
            Self::Uuid(id) => Some(id.hyphenated().to_string()),
            Self::Date(at) => Some(crate::encode::format_date(at)),
            Self::Undef | Self::Binary(_) | Self::Array(_) | Self::Map(_) => None,
        }
    }
}

impl fmt::Display for LlsdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undef => write!(f, "undef"),
            Self::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Self::Array(items) => {
                write!(f, "[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            scalar => match scalar.scalar_text() {
                Some(text) => write!(f, "{text}"),
                None => Ok(()),
            },
        }
    }
}

impl From<bool> for LlsdValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for LlsdValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for LlsdValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for LlsdValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for LlsdValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Uuid> for LlsdValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DateTime<Utc>> for LlsdValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<Vec<LlsdValue>> for LlsdValue {
    fn from(value: Vec<LlsdValue>) -> Self {
        Self::Array(value)
    }
}

impl From<LlsdMap> for LlsdValue {
    fn from(value: LlsdMap) -> Self {
        Self::Map(value)
    }
}
