//! `<kRoomList>` replies: `<kRoomList><room>A</room><room>B</room></kRoomList>`

use std::collections::HashSet;

use crate::common::xml_decode::{child_elements, element_text, expect_name, parse_element};
use crate::error::{ParseError, ParseResult};

const ROOM_LIST_ELEMENT: &str = "kRoomList";
const ROOM_ELEMENT: &str = "room";

/// Decode a complete `<kRoomList>` element into room ids, in discovery order.
pub fn parse_room_list(element: &str) -> ParseResult<Vec<String>> {
    let root = parse_element(element)?;
    expect_name(&root, ROOM_LIST_ELEMENT)?;

    let stray = element_text(&root);
    if !stray.is_empty() {
        return Err(ParseError::MalformedBody(format!(
            "unexpected text inside room list: {}",
            stray
        )));
    }

    let mut seen = HashSet::new();
    let mut rooms = Vec::new();
    for child in child_elements(&root) {
        if child.name != ROOM_ELEMENT {
            return Err(ParseError::UnexpectedElement {
                expected: ROOM_ELEMENT.to_string(),
                found: child.name.clone(),
            });
        }
        let id = element_text(child);
        if id.is_empty() {
            return Err(ParseError::MalformedBody("empty room id".to_string()));
        }
        if seen.insert(id.clone()) {
            rooms.push(id);
        }
    }

    Ok(rooms)
}
