use crate::error::{FaidxError, Result};
use std::{fmt, str::FromStr};

/// A requested region of a sequence.
///
/// Positions are 1-based and inclusive. A region without positions covers the
/// whole sequence.
///
/// Parsed from `name`, `name:pos`, `name:start..stop` or `name:start-stop`.
/// The name ends at the first `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    pub start: Option<i64>,
    pub stop: Option<i64>,
}
impl Region {
    pub fn whole(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: None,
            stop: None,
        }
    }

    pub fn span(name: &str, start: i64, stop: i64) -> Self {
        Self {
            name: name.to_string(),
            start: Some(start),
            stop: Some(stop),
        }
    }

    /// Number of residues requested, or `None` for a whole sequence.
    pub fn length(&self) -> Option<i64> {
        match (self.start, self.stop) {
            (Some(start), Some(stop)) => Some(stop.saturating_sub(start).saturating_add(1)),
            (Some(_), None) => Some(1),
            _ => None,
        }
    }
}

impl FromStr for Region {
    type Err = FaidxError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, positions) = match s.split_once(':') {
            Some(split) => split,
            None if s.is_empty() => {
                return Err(FaidxError::invalid_region(s, "missing sequence name"))
            }
            None => return Ok(Self::whole(s)),
        };
        if name.is_empty() {
            return Err(FaidxError::invalid_region(s, "missing sequence name"));
        }

        // a dash wins over dots when both are present
        let (start, stop) = if let Some((start, stop)) = positions.split_once('-') {
            (start, stop)
        } else if let Some((start, stop)) = positions.split_once("..") {
            (start, stop)
        } else {
            (positions, positions)
        };
        Ok(Self::span(
            name,
            parse_position(s, start)?,
            parse_position(s, stop)?,
        ))
    }
}

fn parse_position(region: &str, text: &str) -> Result<i64> {
    text.trim()
        .parse()
        .map_err(|_| FaidxError::invalid_region(region, format!("bad position '{}'", text)))
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.stop) {
            (Some(start), Some(stop)) if start == stop => write!(f, "{}:{}", self.name, start),
            (Some(start), Some(stop)) => write!(f, "{}:{}-{}", self.name, start, stop),
            (Some(start), None) => write!(f, "{}:{}", self.name, start),
            _ => write!(f, "{}", self.name),
        }
    }
}
