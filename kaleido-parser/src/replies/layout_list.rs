//! `<kLayoutList>` replies.
//!
//! Firmware families disagree on how a layout list is spelled. The known
//! encodings form a closed set, tried in this order:
//!
//! | Format               | Example body                          | id              | label       |
//! |----------------------|---------------------------------------|-----------------|-------------|
//! | `Empty`              | `<kLayoutList/>`, `<kLayoutList></kLayoutList>` | -     | -           |
//! | `Quoted`             | `"User Preset 1" "Layout B"`          | content         | content     |
//! | `ExtensionSuffixed`  | `ROOM1/Layout1.kg2 Layout2.kg2`       | token           | token without room prefix and extension |
//! | `BareTokens`         | `Layout1 ROOM1/Layout2`               | token           | token without room prefix |
//!
//! Ids are de-duplicated, keeping the first occurrence and source order.

use std::collections::HashSet;

use crate::common::xml_decode::{child_elements, element_text, expect_name, parse_element};
use crate::error::{ParseError, ParseResult};

const LAYOUT_LIST_ELEMENT: &str = "kLayoutList";

/// One recallable layout as reported by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEntry {
    /// Device-native name, possibly with a `room/` prefix and an extension
    pub id: String,
    /// Display name
    pub label: String,
}

impl LayoutEntry {
    /// Build an entry whose label is derived from the id
    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        let label = layout_label(&id);
        Self { id, label }
    }
}

/// Encodings a layout list body may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutListFormat {
    Empty,
    Quoted,
    ExtensionSuffixed,
    BareTokens,
}

/// Decode a complete `<kLayoutList>` element.
pub fn parse_layout_list(element: &str) -> ParseResult<Vec<LayoutEntry>> {
    let root = parse_element(element)?;
    expect_name(&root, LAYOUT_LIST_ELEMENT)?;
    if let Some(child) = child_elements(&root).next() {
        return Err(ParseError::MalformedBody(format!(
            "unexpected <{}> inside layout list",
            child.name
        )));
    }

    decode_layout_body(&element_text(&root)).map(|(_, entries)| entries)
}

/// Detect the encoding of a layout list body and decode it.
pub fn decode_layout_body(body: &str) -> ParseResult<(LayoutListFormat, Vec<LayoutEntry>)> {
    let body = body.trim();
    if body.is_empty() {
        return Ok((LayoutListFormat::Empty, Vec::new()));
    }

    if body.contains('"') {
        let names = split_quoted(body)?;
        let entries = names
            .into_iter()
            .map(|name| LayoutEntry {
                id: name.to_string(),
                label: name.to_string(),
            })
            .collect();
        return Ok((LayoutListFormat::Quoted, dedup(entries)));
    }

    let tokens: Vec<&str> = body.split_whitespace().collect();
    let format = if tokens.iter().all(|t| split_extension(t).1.is_some()) {
        LayoutListFormat::ExtensionSuffixed
    } else {
        LayoutListFormat::BareTokens
    };
    let entries = tokens.into_iter().map(LayoutEntry::from_id).collect();

    Ok((format, dedup(entries)))
}

/// Display label for a layout id: room prefix and extension removed.
pub fn layout_label(id: &str) -> String {
    let name = split_room(id).1;
    split_extension(name).0.to_string()
}

/// Split `room/layout` at the first `/`.
pub fn split_room(id: &str) -> (Option<&str>, &str) {
    match id.split_once('/') {
        Some((room, name)) if !room.is_empty() => (Some(room), name),
        _ => (None, id),
    }
}

/// Split a trailing `.ext` off a layout name.
///
/// A leading dot (`.hidden`) and a trailing dot (`name.`) are not extensions.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => {
            let ext = &name[dot + 1..];
            if ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                (&name[..dot], Some(ext))
            } else {
                (name, None)
            }
        }
        _ => (name, None),
    }
}

fn split_quoted(body: &str) -> ParseResult<Vec<&str>> {
    let mut names = Vec::new();
    let mut rest = body;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(names);
        }
        let Some(open) = rest.strip_prefix('"') else {
            return Err(ParseError::MalformedBody(format!(
                "text outside quotes in layout list: {}",
                rest
            )));
        };
        let Some(close) = open.find('"') else {
            return Err(ParseError::MalformedBody("unterminated quote in layout list".to_string()));
        };
        let name = &open[..close];
        if !name.trim().is_empty() {
            names.push(name);
        }
        rest = &open[close + 1..];
    }
}

fn dedup(entries: Vec<LayoutEntry>) -> Vec<LayoutEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect()
}
