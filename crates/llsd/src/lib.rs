//! Linden Lab Structured Data (LLSD) in its XML serialisation.
//!
//! The crate models LLSD values as [`LlsdValue`], keeps map entries in
//! document order via [`LlsdMap`], and converts to and from the XML form used
//! by capability services.
//!
//! ```
//! use llsd::{LlsdMap, LlsdValue, from_xml_str, to_xml_string};
//!
//! let map: LlsdMap = [("username", "benny4821")].into_iter().collect();
//! let xml = to_xml_string(&LlsdValue::Map(map.clone()))?;
//! assert_eq!(from_xml_str(&xml)?, LlsdValue::Map(map));
//! # Ok::<(), llsd::LlsdError>(())
//! ```

mod decode;
mod encode;
mod error;
mod map;
mod value;

pub use decode::{MAX_NESTING_DEPTH, from_xml_slice, from_xml_str};
pub use encode::{to_xml_bytes, to_xml_string};
pub use error::LlsdError;
pub use map::LlsdMap;
pub use value::LlsdValue;

/// MIME type for LLSD XML request and response bodies.
pub const CONTENT_TYPE: &str = "application/llsd+xml";
