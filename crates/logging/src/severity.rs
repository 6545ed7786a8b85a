//! crates/logging/src/severity.rs
//! Conventional log severities with a total order.

use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
///
/// The numeric values match the levels understood by dictionary-based
/// logging configurations (`DEBUG` = 10 … `CRITICAL` = 50).
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Detailed diagnostics.
    Debug = 10,
    /// Routine operational messages.
    Info = 20,
    /// Something unexpected that did not stop the request.
    Warning = 30,
    /// A failure of the current operation.
    Error = 40,
    /// A failure that threatens the process.
    Critical = 50,
}

impl Severity {
    /// Every severity in ascending order.
    pub const ALL: [Self; 5] = [
        Self::Debug,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// Returns the level name rendered by `%(levelname)s`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Returns the numeric level rendered by `%(levelno)d`.
    #[must_use]
    pub const fn value(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" | "FATAL" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(name.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);

        let mut sorted = Severity::ALL;
        sorted.sort();
        assert_eq!(sorted, Severity::ALL);
    }

    #[test]
    fn level_names_and_values() {
        assert_eq!(Severity::Warning.as_str(), "WARNING");
        assert_eq!(Severity::Critical.to_string(), "CRITICAL");
        assert_eq!(Severity::Info.value(), 20);
        assert_eq!(Severity::Debug.value(), 10);
    }

    #[test]
    fn parses_level_names_case_insensitively() {
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Info));
        assert_eq!(" WARN ".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("Fatal".parse::<Severity>(), Ok(Severity::Critical));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn serializes_as_uppercase_name() {
        let json = serde_json::to_string(&Severity::Info).unwrap();
        assert_eq!(json, "\"INFO\"");
        let parsed: Severity = serde_json::from_str("\"ERROR\"").unwrap();
        assert_eq!(parsed, Severity::Error);
    }
}
