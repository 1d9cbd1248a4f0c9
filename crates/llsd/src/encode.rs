//! LLSD XML serialisation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::{LlsdError, LlsdValue};

/// Serialise a value into a compact LLSD XML document.
///
/// The output has no XML declaration and no insignificant whitespace.
///
/// # Errors
///
/// Returns [`LlsdError::Write`] when the XML writer fails.
///
/// # Examples
/// ```
/// use llsd::{LlsdMap, LlsdValue, to_xml_string};
///
/// let map: LlsdMap = [("username", "benny4821")].into_iter().collect();
/// let xml = to_xml_string(&LlsdValue::Map(map))?;
/// assert_eq!(
///     xml,
///     "<llsd><map><key>username</key><string>benny4821</string></map></llsd>"
/// );
/// # Ok::<(), llsd::LlsdError>(())
/// ```
pub fn to_xml_string(value: &LlsdValue) -> Result<String, LlsdError> {
    let bytes = to_xml_bytes(value)?;
    String::from_utf8(bytes).map_err(LlsdError::write)
}

/// Serialise a value into LLSD XML bytes.
///
/// # Errors
///
/// Returns [`LlsdError::Write`] when the XML writer fails.
pub fn to_xml_bytes(value: &LlsdValue) -> Result<Vec<u8>, LlsdError> {
    let mut writer = Writer::new(Vec::new());
    emit(&mut writer, Event::Start(BytesStart::new("llsd")))?;
    write_value(&mut writer, value)?;
    emit(&mut writer, Event::End(BytesEnd::new("llsd")))?;
    Ok(writer.into_inner())
}

pub(crate) fn format_date(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn write_value(writer: &mut Writer<Vec<u8>>, value: &LlsdValue) -> Result<(), LlsdError> {
    match value {
        LlsdValue::Undef => emit(writer, Event::Empty(BytesStart::new("undef"))),
        LlsdValue::Boolean(flag) => {
            write_scalar(writer, "boolean", if *flag { "true" } else { "false" })
        }
        LlsdValue::Integer(number) => write_scalar(writer, "integer", &number.to_string()),
        LlsdValue::Real(number) => write_scalar(writer, "real", &number.to_string()),
        LlsdValue::String(text) => write_scalar(writer, "string", text),
        LlsdValue::Uuid(id) => write_scalar(writer, "uuid", &id.hyphenated().to_string()),
        LlsdValue::Date(at) => write_scalar(writer, "date", &format_date(at)),
        LlsdValue::Uri(text) => write_scalar(writer, "uri", text),
        LlsdValue::Binary(bytes) => {
            let mut start = BytesStart::new("binary");
            start.push_attribute(("encoding", "base64"));
            let encoded = STANDARD.encode(bytes);
            if encoded.is_empty() {
                return emit(writer, Event::Empty(start));
            }
            emit(writer, Event::Start(start))?;
            emit(writer, Event::Text(BytesText::new(&encoded)))?;
            emit(writer, Event::End(BytesEnd::new("binary")))
        }
        LlsdValue::Array(items) => {
            emit(writer, Event::Start(BytesStart::new("array")))?;
            for item in items {
                write_value(writer, item)?;
            }
            emit(writer, Event::End(BytesEnd::new("array")))
        }
        LlsdValue::Map(map) => {
            emit(writer, Event::Start(BytesStart::new("map")))?;
            for (key, item) in map.iter() {
                write_scalar(writer, "key", key)?;
                write_value(writer, item)?;
            }
            emit(writer, Event::End(BytesEnd::new("map")))
        }
    }
}

fn write_scalar(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<(), LlsdError> {
    if text.is_empty() {
        return emit(writer, Event::Empty(BytesStart::new(name)));
    }
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), LlsdError> {
    writer.write_event(event).map_err(LlsdError::write)
}
