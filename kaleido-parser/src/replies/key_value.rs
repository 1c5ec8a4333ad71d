//! Generic `<TAG>KEY="VALUE"</TAG>` replies

use crate::common::xml_decode::{child_elements, element_text, parse_element};

/// A single `KEY="VALUE"` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Parse a whole `<TAG>KEY="VALUE"</TAG>` element named `tag`.
///
/// Returns `None` for anything that is not exactly one well-formed `tag`
/// element whose body is one key/value pair. The value may be empty or
/// contain spaces.
pub fn parse_key_value_reply(input: &str, tag: &str) -> Option<KeyValue> {
    let element = parse_element(input).ok()?;
    if element.name != tag || child_elements(&element).next().is_some() {
        return None;
    }
    parse_key_value_body(&element_text(&element))
}

/// Parse the body of a key/value reply: `KEY="VALUE"`.
pub fn parse_key_value_body(body: &str) -> Option<KeyValue> {
    let (key, rest) = body.trim().split_once('=')?;
    let key = key.trim();
    if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '"') {
        return None;
    }

    let value = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    if value.contains('"') {
        return None;
    }

    Some(KeyValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
