//! Severity levels attached to log entries.
//!
//! ## Logging Levels
//!
//! Defined in [`Level`]. Consists of 6 severities plus [`Level::None`]:
//!
//! * [`Trace`]
//! * [`Debug`]
//! * [`Information`]
//! * [`Warning`]
//! * [`Error`]
//! * [`Critical`]
//!
//! `None` is never written by a target. A decision resolving to `None` means
//! the method is not logged at all, and a target with a minimum level of
//! `None` accepts nothing.
//!
//! Levels are parsed case-insensitively and accept the short aliases used by
//! most configuration files (`info`, `warn`, `INF`, ...).
//!
//! [`Trace`]: crate::level::Level::Trace
//! [`Debug`]: crate::level::Level::Debug
//! [`Information`]: crate::level::Level::Information
//! [`Warning`]: crate::level::Level::Warning
//! [`Error`]: crate::level::Level::Error
//! [`Critical`]: crate::level::Level::Critical

use std::{fmt::Display, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[repr(usize)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum Level {
    /// Designates trace information, which is of very low priority
    Trace = 0,
    /// Designates debug information, which is of low priority
    Debug = 1,
    /// Designates useful information
    #[default]
    Information = 2,
    /// Designates potentially hazardous situations
    Warning = 3,
    /// Designates serious errors
    Error = 4,
    /// Designates failures requiring immediate attention
    Critical = 5,
    /// Disables logging
    None = 6,
}

const LEVEL_STRINGS: [&str; 7] = [
    "Trace",
    "Debug",
    "Information",
    "Warning",
    "Error",
    "Critical",
    "None",
];

const LEVEL_SHORT_STRINGS: [&str; 7] = ["TRC", "DBG", "INF", "WRN", "ERR", "CRT", "OFF"];

impl Level {
    /// Three letter form used in line prefixes, e.g. `[INF]`.
    pub fn as_short_str(&self) -> &'static str {
        LEVEL_SHORT_STRINGS[*self as usize]
    }

    pub fn as_str(&self) -> &'static str {
        LEVEL_STRINGS[*self as usize]
    }

    /// Whether an entry at `self` passes a `minimum` threshold.
    #[inline]
    pub fn is_enabled_for(&self, minimum: Level) -> bool {
        *self != Level::None && minimum != Level::None && *self >= minimum
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLevelError(String);

impl Display for ParseLevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "level {}: not recognized", self.0)
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.trim().to_ascii_lowercase().as_str() {
            "trace" | "trc" | "0" => Level::Trace,
            "debug" | "dbg" | "1" => Level::Debug,
            "information" | "info" | "inf" | "2" => Level::Information,
            "warning" | "warn" | "wrn" | "3" => Level::Warning,
            "error" | "err" | "4" => Level::Error,
            "critical" | "crit" | "crt" | "5" => Level::Critical,
            "none" | "off" | "6" => Level::None,
            _ => return Err(ParseLevelError(s.to_string())),
        };

        Ok(level)
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
