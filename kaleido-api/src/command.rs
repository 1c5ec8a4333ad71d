//! Typed device commands
//!
//! A [`Command`] is the exact request text plus a [`CommandKind`] decided
//! once, when the command is built. Builders cover every request the client
//! issues itself; [`Command::raw`] accepts arbitrary text and infers the kind
//! from its shape, falling back to [`CommandKind::Unrecognized`].

use std::fmt;

use kaleido_parser::replies::layout_list::split_room;
use quick_xml::escape::escape;

use crate::error::{ApiError, Result};
use crate::model::{RoomId, Scope, ROOT_SUFFIX};
use crate::status::{StatusLevel, TallyColor, ALARM_STATUS_ID};

/// Keys accepted by `<getParameterInfo>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Parameter {
    SoftwareVersion,
    SystemName,
    Other(String),
}

impl Parameter {
    pub fn key(&self) -> &str {
        match self {
            Parameter::SoftwareVersion => "softwareVersion",
            Parameter::SystemName => "systemName",
            Parameter::Other(key) => key,
        }
    }

    pub fn from_key(key: &str) -> Self {
        match key {
            "softwareVersion" => Parameter::SoftwareVersion,
            "systemName" => Parameter::SystemName,
            other => Parameter::Other(other.to_string()),
        }
    }
}

/// Closed set of command families, each with one expected reply shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// `<openID>`: root when the target is `HOST_0_4_0_0`, otherwise a room
    OpenSession(Scope),
    CloseSession,
    GetParameter(Parameter),
    GetLayoutList,
    GetRoomList,
    GetCurrentLayout,
    /// `<setKCurrentLayout>`
    SetLayout {
        /// Layout text as sent
        layout: String,
        /// Room whose current layout changes, if known
        room: Option<RoomId>,
    },
    SetText,
    SetStatus,
    /// Text no reply parser knows how to answer
    Unrecognized,
}

/// One request, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String,
    kind: CommandKind,
}

impl Command {
    fn new(text: String, kind: CommandKind) -> Self {
        Self { text, kind }
    }

    /// Arbitrary request text; the kind is inferred from its shape.
    pub fn raw(text: impl Into<String>) -> Self {
        let text = text.into();
        let kind = infer_kind(text.trim());
        Self { text, kind }
    }

    /// Open (or reopen) the root context of the device at `host`
    pub fn open_host(host: &str) -> Self {
        Self::new(
            format!("<openID>{}{}</openID>", host, ROOT_SUFFIX),
            CommandKind::OpenSession(Scope::Root),
        )
    }

    pub fn open_room(room: &RoomId) -> Self {
        Self::new(
            format!("<openID>{}</openID>", room),
            CommandKind::OpenSession(Scope::Room(room.clone())),
        )
    }

    pub fn close() -> Self {
        Self::new("<closeID/>".to_string(), CommandKind::CloseSession)
    }

    pub fn get_parameter(parameter: Parameter) -> Self {
        Self::new(
            format!(
                r#"<getParameterInfo>get key="{}"</getParameterInfo>"#,
                parameter.key()
            ),
            CommandKind::GetParameter(parameter),
        )
    }

    pub fn get_layout_list() -> Self {
        Self::new("<getKLayoutList/>".to_string(), CommandKind::GetLayoutList)
    }

    pub fn get_room_list() -> Self {
        Self::new("<getKRoomList/>".to_string(), CommandKind::GetRoomList)
    }

    pub fn get_current_layout() -> Self {
        Self::new("<getKCurrentLayout/>".to_string(), CommandKind::GetCurrentLayout)
    }

    /// Recall a layout by its device id.
    ///
    /// A `room/` prefix marks the layout as belonging to that room; the queue
    /// expands such commands into open, set, close.
    pub fn set_layout(layout: &str) -> Result<Self> {
        let layout = validate_layout(layout)?;
        let room = split_room(layout).0.map(RoomId::new);
        Ok(Self::new(
            format!("<setKCurrentLayout>set {}</setKCurrentLayout>", layout),
            CommandKind::SetLayout {
                layout: layout.to_string(),
                room,
            },
        ))
    }

    /// Recall `layout` inside `room`. The queue wraps it in open and close.
    pub fn set_layout_in_room(room: &RoomId, layout: &str) -> Result<Self> {
        let layout = validate_layout(layout)?;
        Ok(Self::new(
            format!("<setKCurrentLayout>set {}</setKCurrentLayout>", layout),
            CommandKind::SetLayout {
                layout: layout.to_string(),
                room: Some(room.clone()),
            },
        ))
    }

    /// Set the UMD text; markup characters are escaped.
    pub fn umd_text(text: &str) -> Result<Self> {
        if text.contains(['\r', '\n']) {
            return Err(ApiError::invalid("text", "must be a single line"));
        }
        Ok(Self::new(
            format!(
                r#"<setKDynamicText>set address="0" text="{}"</setKDynamicText>"#,
                escape(text)
            ),
            CommandKind::SetText,
        ))
    }

    pub fn status(id: u8, level: StatusLevel) -> Self {
        Self::new(
            format!(
                r#"<setKStatusMessage>set id="{}" status="{}"</setKStatusMessage>"#,
                id, level
            ),
            CommandKind::SetStatus,
        )
    }

    /// Tally box in the UMD: active shows `MINOR`, inactive `NORMAL`
    pub fn tally(color: TallyColor, active: bool) -> Self {
        let level = if active {
            StatusLevel::Minor
        } else {
            StatusLevel::Normal
        };
        Self::status(color.status_id(), level)
    }

    pub fn alarm(level: StatusLevel) -> Self {
        Self::status(ALARM_STATUS_ID, level)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Room and bare layout name when this set-layout names its room inline
    pub fn room_qualified(&self) -> Option<(RoomId, &str)> {
        match &self.kind {
            CommandKind::SetLayout { layout, .. } => match split_room(layout) {
                (Some(room), name) => Some((RoomId::new(room), name)),
                (None, _) => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn validate_layout(layout: &str) -> Result<&str> {
    let layout = layout.trim();
    if layout.is_empty() {
        return Err(ApiError::invalid("layout", "must not be empty"));
    }
    if layout.contains(['\r', '\n', '<', '>']) {
        return Err(ApiError::invalid("layout", "must not contain markup or line breaks"));
    }
    Ok(layout)
}

fn wrapped<'a>(text: &'a str, tag: &str) -> Option<&'a str> {
    text.strip_prefix('<')?
        .strip_prefix(tag)?
        .strip_prefix('>')?
        .strip_suffix('>')?
        .strip_suffix(tag)?
        .strip_suffix("</")
}

fn infer_kind(text: &str) -> CommandKind {
    match text {
        "<closeID/>" => return CommandKind::CloseSession,
        "<getKLayoutList/>" => return CommandKind::GetLayoutList,
        "<getKRoomList/>" => return CommandKind::GetRoomList,
        "<getKCurrentLayout/>" => return CommandKind::GetCurrentLayout,
        _ => {}
    }

    if let Some(target) = wrapped(text, "openID") {
        let target = target.trim();
        if target.is_empty() {
            return CommandKind::Unrecognized;
        }
        let scope = if target.ends_with(ROOT_SUFFIX) {
            Scope::Root
        } else {
            Scope::Room(RoomId::new(target))
        };
        return CommandKind::OpenSession(scope);
    }

    if let Some(body) = wrapped(text, "getParameterInfo") {
        return body
            .trim()
            .strip_prefix("get key=\"")
            .and_then(|rest| rest.strip_suffix('"'))
            .filter(|key| !key.is_empty() && !key.contains('"'))
            .map(|key| CommandKind::GetParameter(Parameter::from_key(key)))
            .unwrap_or(CommandKind::Unrecognized);
    }

    if let Some(body) = wrapped(text, "setKCurrentLayout") {
        return match body.trim().strip_prefix("set ").map(str::trim) {
            Some(layout) if !layout.is_empty() => CommandKind::SetLayout {
                layout: layout.to_string(),
                room: split_room(layout).0.map(RoomId::new),
            },
            _ => CommandKind::Unrecognized,
        };
    }

    if wrapped(text, "setKDynamicText").is_some() {
        return CommandKind::SetText;
    }
    if wrapped(text, "setKStatusMessage").is_some() {
        return CommandKind::SetStatus;
    }

    CommandKind::Unrecognized
}
