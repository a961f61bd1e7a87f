use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Focus,
    Break,
}

/// One of the four fixed session lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    #[default]
    Focus25,
    Focus50,
    Break5,
    Break15,
}

impl SessionMode {
    pub const ALL: [SessionMode; 4] = [
        SessionMode::Focus25,
        SessionMode::Focus50,
        SessionMode::Break5,
        SessionMode::Break15,
    ];

    /// Nominal length in minutes.
    pub fn minutes(self) -> u32 {
        match self {
            SessionMode::Focus25 => 25,
            SessionMode::Focus50 => 50,
            SessionMode::Break5 => 5,
            SessionMode::Break15 => 15,
        }
    }

    pub fn total_seconds(self) -> u32 {
        self.minutes() * 60
    }

    pub fn kind(self) -> SessionKind {
        match self {
            SessionMode::Focus25 | SessionMode::Focus50 => SessionKind::Focus,
            SessionMode::Break5 | SessionMode::Break15 => SessionKind::Break,
        }
    }

    pub fn is_focus(self) -> bool {
        self.kind() == SessionKind::Focus
    }

    /// Human-facing label, e.g. `"Focus 25"`.
    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Focus25 => "Focus 25",
            SessionMode::Focus50 => "Focus 50",
            SessionMode::Break5 => "Break 5",
            SessionMode::Break15 => "Break 15",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown session mode '{0}' (expected one of: Focus 25, Focus 50, Break 5, Break 15)")]
pub struct ParseModeError(pub String);

impl FromStr for SessionMode {
    type Err = ParseModeError;

    /// Accepts labels (`"Focus 25"`) as well as compact forms
    /// (`focus25`, `break-15`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "focus25" => Ok(SessionMode::Focus25),
            "focus50" => Ok(SessionMode::Focus50),
            "break5" => Ok(SessionMode::Break5),
            "break15" => Ok(SessionMode::Break15),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}
