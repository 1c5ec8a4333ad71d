//! `<kCurrentLayout>` replies.
//!
//! Two firmware variants are in the field and neither announces itself, so
//! they are tried in a fixed order:
//!
//! 1. key/value: `<kCurrentLayout>name="CurrentLayout.kg2"</kCurrentLayout>`
//! 2. bare value: `<kCurrentLayout>Currentlayout.xml</kCurrentLayout>`

use crate::common::xml_decode::{child_elements, element_text, expect_name, parse_element};
use crate::error::{ParseError, ParseResult};

use super::key_value::parse_key_value_body;

const CURRENT_LAYOUT_ELEMENT: &str = "kCurrentLayout";

/// Decode a complete `<kCurrentLayout>` element into the layout name.
pub fn parse_current_layout(element: &str) -> ParseResult<String> {
    let root = parse_element(element)?;
    expect_name(&root, CURRENT_LAYOUT_ELEMENT)?;
    if let Some(child) = child_elements(&root).next() {
        return Err(ParseError::MalformedBody(format!(
            "unexpected <{}> inside current layout reply",
            child.name
        )));
    }

    let body = element_text(&root);
    if body.is_empty() {
        return Err(ParseError::MalformedBody("empty current layout".to_string()));
    }

    if body.contains('=') {
        return parse_key_value_body(&body)
            .map(|kv| kv.value)
            .ok_or_else(|| ParseError::MalformedBody(format!("bad key/value body: {}", body)));
    }

    Ok(body)
}
