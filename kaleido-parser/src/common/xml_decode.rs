//! Decoding of a single, already-framed reply element.
//!
//! Replies are tiny, so each one is decoded into an `xmltree::Element` and
//! the shape-specific parsers walk that tree.

use xmltree::{Element, XMLNode};

use crate::error::{ParseError, ParseResult};

/// Decode a complete reply element.
pub fn parse_element(element: &str) -> ParseResult<Element> {
    Element::parse(element.as_bytes()).map_err(|e| ParseError::XmlDecodingFailed(e.to_string()))
}

/// Check that a reply came back under the element name its command expects.
pub fn expect_name(element: &Element, expected: &str) -> ParseResult<()> {
    if element.name == expected {
        Ok(())
    } else {
        Err(ParseError::UnexpectedElement {
            expected: expected.to_string(),
            found: element.name.clone(),
        })
    }
}

/// Concatenated character data directly inside `element`, trimmed.
///
/// Text of nested elements is not included.
pub fn element_text(element: &Element) -> String {
    let mut text = String::new();
    for node in &element.children {
        match node {
            XMLNode::Text(t) | XMLNode::CData(t) => text.push_str(t),
            _ => {}
        }
    }
    text.trim().to_string()
}

/// Direct child elements of `element`, in document order.
pub fn child_elements(element: &Element) -> impl Iterator<Item = &Element> {
    element.children.iter().filter_map(|node| node.as_element())
}
