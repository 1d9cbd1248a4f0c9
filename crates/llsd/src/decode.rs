//! LLSD XML parsing.
//!
//! The decoder walks `quick-xml` events directly rather than building a DOM.
//! Whitespace between elements is ignored; text inside scalar elements is kept
//! verbatim (after entity unescaping).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use uuid::Uuid;

use crate::{LlsdError, LlsdMap, LlsdValue};

/// Deepest container nesting the decoder accepts.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Decode an LLSD XML document held in a byte slice.
///
/// # Errors
///
/// Returns [`LlsdError::InvalidUtf8`] for non UTF-8 input and the errors of
/// [`from_xml_str`] otherwise.
pub fn from_xml_slice(bytes: &[u8]) -> Result<LlsdValue, LlsdError> {
    let text = std::str::from_utf8(bytes).map_err(|error| LlsdError::InvalidUtf8 {
        message: error.to_string(),
    })?;
    from_xml_str(text)
}

/// Decode an LLSD XML document.
///
/// Only the first value inside `<llsd>` is decoded; an empty root yields
/// [`LlsdValue::Undef`].
///
/// # Errors
///
/// Returns an [`LlsdError`] when the XML is malformed, the root is missing, or
/// a scalar cannot be parsed.
///
/// # Examples
/// ```
/// use llsd::{LlsdValue, from_xml_str};
///
/// let value = from_xml_str(
///     "<?xml version=\"1.0\"?><llsd><map><key>7</key><string>Resident</string></map></llsd>",
/// )?;
/// let map = value.as_map().expect("map");
/// assert_eq!(map.get("7"), Some(&LlsdValue::from("Resident")));
/// # Ok::<(), llsd::LlsdError>(())
/// ```
pub fn from_xml_str(xml: &str) -> Result<LlsdValue, LlsdError> {
    let mut reader = Reader::from_str(xml);
    if seek_root(&mut reader)? == Root::Empty {
        return Ok(LlsdValue::Undef);
    }

    match next_node(&mut reader, "inside <llsd>")? {
        Node::Start(start) => parse_element(&mut reader, &start, 0),
        Node::Empty(start) => empty_value(&start),
        Node::End => Ok(LlsdValue::Undef),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Root {
    Open,
    Empty,
}

enum Node<'a> {
    Start(BytesStart<'a>),
    Empty(BytesStart<'a>),
    End,
}

fn seek_root(reader: &mut Reader<&[u8]>) -> Result<Root, LlsdError> {
    loop {
        match reader.read_event().map_err(LlsdError::malformed)? {
            Event::Start(start) if start.name().as_ref() == b"llsd" => return Ok(Root::Open),
            Event::Empty(start) if start.name().as_ref() == b"llsd" => return Ok(Root::Empty),
            Event::Start(start) | Event::Empty(start) => {
                return Err(LlsdError::UnexpectedElement {
                    name: element_name(&start),
                    context: "before the <llsd> root",
                });
            }
            Event::Eof => return Err(LlsdError::MissingRoot),
            _ => {}
        }
    }
}

/// Skip whitespace, comments, and processing instructions until the next
/// element boundary.
fn next_node<'a>(
    reader: &mut Reader<&'a [u8]>,
    context: &'static str,
) -> Result<Node<'a>, LlsdError> {
    loop {
        match reader.read_event().map_err(LlsdError::malformed)? {
            Event::Start(start) => return Ok(Node::Start(start)),
            Event::Empty(start) => return Ok(Node::Empty(start)),
            Event::End(_) => return Ok(Node::End),
            Event::Eof => return Err(LlsdError::UnexpectedEof { context }),
            _ => {}
        }
    }
}

fn parse_element(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
    depth: usize,
) -> Result<LlsdValue, LlsdError> {
    match start.name().as_ref() {
        b"map" => parse_map(reader, enter(depth)?),
        b"array" => parse_array(reader, enter(depth)?),
        b"binary" => {
            check_binary_encoding(start)?;
            let text = read_text(reader, "binary")?;
            decode_binary(&text)
        }
        _ => {
            let kind = scalar_kind(start)?;
            let text = read_text(reader, kind)?;
            parse_scalar(kind, &text)
        }
    }
}

/// Open a container at `depth` (the number of enclosing containers),
/// returning the depth of its children.
const fn enter(depth: usize) -> Result<usize, LlsdError> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(LlsdError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
        });
    }
    Ok(depth + 1)
}

fn empty_value(start: &BytesStart<'_>) -> Result<LlsdValue, LlsdError> {
    match start.name().as_ref() {
        b"map" => Ok(LlsdValue::Map(LlsdMap::new())),
        b"array" => Ok(LlsdValue::Array(Vec::new())),
        b"binary" => {
            check_binary_encoding(start)?;
            Ok(LlsdValue::Binary(Vec::new()))
        }
        _ => parse_scalar(scalar_kind(start)?, ""),
    }
}

fn parse_map(reader: &mut Reader<&[u8]>, depth: usize) -> Result<LlsdValue, LlsdError> {
    let mut map = LlsdMap::new();
    loop {
        let key = match next_node(reader, "inside <map>")? {
            Node::End => return Ok(LlsdValue::Map(map)),
            Node::Start(start) if start.name().as_ref() == b"key" => read_text(reader, "key")?,
            Node::Empty(start) if start.name().as_ref() == b"key" => String::new(),
            Node::Start(start) | Node::Empty(start) => {
                return Err(LlsdError::UnexpectedElement {
                    name: element_name(&start),
                    context: "where a map <key> was expected",
                });
            }
        };

        let value = match next_node(reader, "after a map <key>")? {
            Node::Start(start) => parse_element(reader, &start, depth)?,
            Node::Empty(start) => empty_value(&start)?,
            Node::End => {
                return Err(LlsdError::UnexpectedEof {
                    context: "after a map <key> without a value",
                });
            }
        };
        map.insert(key, value);
    }
}

fn parse_array(reader: &mut Reader<&[u8]>, depth: usize) -> Result<LlsdValue, LlsdError> {
    let mut items = Vec::new();
    loop {
        match next_node(reader, "inside <array>")? {
            Node::End => return Ok(LlsdValue::Array(items)),
            Node::Start(start) => items.push(parse_element(reader, &start, depth)?),
            Node::Empty(start) => items.push(empty_value(&start)?),
        }
    }
}

/// Collect text and CDATA content until the closing tag of a scalar.
fn read_text(reader: &mut Reader<&[u8]>, kind: &'static str) -> Result<String, LlsdError> {
    let mut text = String::new();
    loop {
        match reader.read_event().map_err(LlsdError::malformed)? {
            Event::Text(content) => {
                text.push_str(&content.unescape().map_err(LlsdError::malformed)?);
            }
            Event::CData(content) => text.push_str(&String::from_utf8_lossy(&content)),
            Event::End(_) => return Ok(text),
            Event::Start(start) | Event::Empty(start) => {
                return Err(LlsdError::UnexpectedElement {
                    name: element_name(&start),
                    context: scalar_context(kind),
                });
            }
            Event::Eof => {
                return Err(LlsdError::UnexpectedEof {
                    context: scalar_context(kind),
                });
            }
            _ => {}
        }
    }
}

fn scalar_context(kind: &'static str) -> &'static str {
    match kind.as_bytes() {
        b"key" => "inside <key>",
        b"binary" => "inside <binary>",
        _ => "inside a scalar element",
    }
}

fn scalar_kind(start: &BytesStart<'_>) -> Result<&'static str, LlsdError> {
    let kind = match start.name().as_ref() {
        b"undef" => "undef",
        b"boolean" => "boolean",
        b"integer" => "integer",
        b"real" => "real",
        b"string" => "string",
        b"uuid" => "uuid",
        b"date" => "date",
        b"uri" => "uri",
        _ => {
            return Err(LlsdError::UnexpectedElement {
                name: element_name(start),
                context: "where an LLSD value was expected",
            });
        }
    };
    Ok(kind)
}

fn parse_scalar(kind: &'static str, text: &str) -> Result<LlsdValue, LlsdError> {
    let trimmed = text.trim();
    match kind {
        "undef" => Ok(LlsdValue::Undef),
        "boolean" => match trimmed {
            "true" | "1" => Ok(LlsdValue::Boolean(true)),
            "false" | "0" | "" => Ok(LlsdValue::Boolean(false)),
            other => Err(LlsdError::invalid_scalar(kind, other, "expected true, false, 1, or 0")),
        },
        "integer" if trimmed.is_empty() => Ok(LlsdValue::Integer(0)),
        "integer" => trimmed
            .parse::<i32>()
            .map(LlsdValue::Integer)
            .map_err(|error| LlsdError::invalid_scalar(kind, trimmed, error)),
        "real" if trimmed.is_empty() => Ok(LlsdValue::Real(0.0)),
        "real" => trimmed
            .parse::<f64>()
            .map(LlsdValue::Real)
            .map_err(|error| LlsdError::invalid_scalar(kind, trimmed, error)),
        "uuid" if trimmed.is_empty() => Ok(LlsdValue::Uuid(Uuid::nil())),
        "uuid" => Uuid::parse_str(trimmed)
            .map(LlsdValue::Uuid)
            .map_err(|error| LlsdError::invalid_scalar(kind, trimmed, error)),
        "date" if trimmed.is_empty() => Ok(LlsdValue::Date(DateTime::<Utc>::UNIX_EPOCH)),
        "date" => DateTime::parse_from_rfc3339(trimmed)
            .map(|at| LlsdValue::Date(at.with_timezone(&Utc)))
            .map_err(|error| LlsdError::invalid_scalar(kind, trimmed, error)),
        "uri" => Ok(LlsdValue::Uri(trimmed.to_owned())),
        _ => Ok(LlsdValue::String(text.to_owned())),
    }
}

fn check_binary_encoding(start: &BytesStart<'_>) -> Result<(), LlsdError> {
    for entry in start.attributes() {
        let attribute = entry.map_err(LlsdError::malformed)?;
        if attribute.key.as_ref() == b"encoding" {
            let encoding = String::from_utf8_lossy(&attribute.value).into_owned();
            if !encoding.eq_ignore_ascii_case("base64") {
                return Err(LlsdError::UnsupportedEncoding { encoding });
            }
        }
    }
    Ok(())
}

fn decode_binary(text: &str) -> Result<LlsdValue, LlsdError> {
    let compact: String = text.split_whitespace().collect();
    STANDARD
        .decode(compact.as_bytes())
        .map(LlsdValue::Binary)
        .map_err(|error| LlsdError::invalid_scalar("binary", &compact, error))
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}
