use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
    Debug,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Success,
        LogLevel::Debug,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Success => "SUCCESS",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevel(pub String);

impl fmt::Display for UnknownLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown log level '{}'", self.0)
    }
}

impl std::error::Error for UnknownLevel {}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// Subsystem a record claims to come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogModule {
    Omega,
    Atlas,
    Prolitage,
    Security,
    System,
}

impl LogModule {
    pub const ALL: [LogModule; 5] = [
        LogModule::Omega,
        LogModule::Atlas,
        LogModule::Prolitage,
        LogModule::Security,
        LogModule::System,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogModule::Omega => "OMEGA",
            LogModule::Atlas => "ATLAS",
            LogModule::Prolitage => "PROLITAGE",
            LogModule::Security => "SECURITY",
            LogModule::System => "SYSTEM",
        }
    }
}

impl fmt::Display for LogModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const MESSAGE_POOL: [&str; 10] = [
    "Reconnaissance scan completed successfully",
    "Network mapping in progress",
    "Agent connection established",
    "Security check passed",
    "Database backup completed",
    "Encryption key rotated",
    "Target acquired",
    "Analysis complete",
    "Connection timeout detected",
    "System integrity verified",
];

/// One synthesized activity line. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub module: LogModule,
    pub message: &'static str,
    pub encrypted: bool,
}

impl LogRecord {
    /// Case-insensitive substring match against message and module.
    /// `needle_lower` must already be lower-cased.
    pub(crate) fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.message.to_lowercase().contains(needle_lower)
            || self.module.as_str().to_lowercase().contains(needle_lower)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ",
            self.timestamp.format("%H:%M:%S"),
            self.level,
            self.module
        )?;
        if self.encrypted {
            f.write_str("[ENCRYPTED] ")?;
        }
        f.write_str(self.message)
    }
}

/// Per-level tallies over a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelCounts([usize; 5]);

impl LevelCounts {
    pub fn get(&self, level: LogLevel) -> usize {
        self.0[level.index()]
    }

    pub(crate) fn bump(&mut self, level: LogLevel) {
        self.0[level.index()] += 1;
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogLevel, usize)> + '_ {
        LogLevel::ALL.into_iter().map(move |level| (level, self.get(level)))
    }
}
