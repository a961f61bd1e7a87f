use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spectral shape of a generated noise bed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
}

impl NoiseColor {
    pub const ALL: [NoiseColor; 3] = [NoiseColor::White, NoiseColor::Pink, NoiseColor::Brown];

    /// Stable lowercase name, also used as the cache file stem.
    pub fn name(self) -> &'static str {
        match self {
            NoiseColor::White => "white",
            NoiseColor::Pink => "pink",
            NoiseColor::Brown => "brown",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            NoiseColor::White => 0,
            NoiseColor::Pink => 1,
            NoiseColor::Brown => 2,
        }
    }
}

impl fmt::Display for NoiseColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown noise color '{0}' (expected white, pink or brown)")]
pub struct ParseColorError(pub String);

impl FromStr for NoiseColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Ok(NoiseColor::White),
            "pink" => Ok(NoiseColor::Pink),
            "brown" | "brownian" | "red" => Ok(NoiseColor::Brown),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

/// Parse a color selection where `"none"`/`"off"` means no noise.
pub fn parse_selection(s: &str) -> Result<Option<NoiseColor>, ParseColorError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "none" | "off" | "" => Ok(None),
        other => other.parse().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back() {
        for color in NoiseColor::ALL {
            assert_eq!(color.name().parse(), Ok(color));
        }
    }

    #[test]
    fn selection_accepts_none() {
        assert_eq!(parse_selection("none"), Ok(None));
        assert_eq!(parse_selection("Off"), Ok(None));
        assert_eq!(parse_selection("PINK"), Ok(Some(NoiseColor::Pink)));
        assert!(parse_selection("green").is_err());
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 3];
        for color in NoiseColor::ALL {
            assert!(!seen[color.index()]);
            seen[color.index()] = true;
        }
    }
}
