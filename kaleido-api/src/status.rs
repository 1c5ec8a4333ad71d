//! Status indicators driven through `<setKStatusMessage>`

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ApiError;

/// Level of a status indicator as the device names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Normal,
    /// Shown in yellow on the alarm border
    Minor,
    /// Shown in red on the alarm border
    Error,
}

impl StatusLevel {
    /// Wire spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusLevel::Normal => "NORMAL",
            StatusLevel::Minor => "MINOR",
            StatusLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusLevel {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(StatusLevel::Normal),
            "minor" => Ok(StatusLevel::Minor),
            "error" | "critical" => Ok(StatusLevel::Error),
            _ => Err(ApiError::UnknownValue {
                what: "status level",
                value: s.to_string(),
            }),
        }
    }
}

/// Tally box colour in the UMD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyColor {
    Green,
    Red,
}

impl TallyColor {
    /// Status message id that drives this tally box
    pub fn status_id(&self) -> u8 {
        match self {
            TallyColor::Green => 2,
            TallyColor::Red => 1,
        }
    }
}

impl FromStr for TallyColor {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(TallyColor::Green),
            "red" => Ok(TallyColor::Red),
            _ => Err(ApiError::UnknownValue {
                what: "tally colour",
                value: s.to_string(),
            }),
        }
    }
}

/// Status message id of the alarm border
pub const ALARM_STATUS_ID: u8 = 0;
