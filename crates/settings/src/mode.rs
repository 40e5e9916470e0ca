//! Monitoring mode

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// What "looking at the work" means for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Working at a screen: sustained head-down is a distraction
    #[default]
    Study,
    /// Working on paper: sustained head-up is a distraction
    Homework,
}

impl Mode {
    /// Wire name (`STUDY` / `HOMEWORK`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Study => "STUDY",
            Mode::Homework => "HOMEWORK",
        }
    }

    /// Display label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Study => "学习模式",
            Mode::Homework => "作业模式",
        }
    }

    /// Parse a mode request, falling back to STUDY for unknown values
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            warn!("Unknown mode {:?}, falling back to STUDY", s);
            Mode::Study
        })
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDY" => Ok(Mode::Study),
            "HOMEWORK" => Ok(Mode::Homework),
            other => Err(format!("unknown mode: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("STUDY".parse::<Mode>(), Ok(Mode::Study));
        assert_eq!("homework".parse::<Mode>(), Ok(Mode::Homework));
        assert!("nap".parse::<Mode>().is_err());
    }

    #[test]
    fn test_unknown_falls_back_to_study() {
        assert_eq!(Mode::parse_lenient("nap"), Mode::Study);
        assert_eq!(Mode::parse_lenient(""), Mode::Study);
        assert_eq!(Mode::parse_lenient("HOMEWORK"), Mode::Homework);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Mode::Homework).unwrap(), "\"HOMEWORK\"");
        let mode: Mode = serde_json::from_str("\"STUDY\"").unwrap();
        assert_eq!(mode, Mode::Study);
    }
}
