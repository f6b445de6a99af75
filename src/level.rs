use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogRecord`](crate::record::LogRecord).
///
/// The set is closed: these eight levels are the contract shared with the
/// host logging pipeline. Each level carries a numeric rank (ascending with
/// importance) and a canonical upper-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Severity {
    pub const ALL: [Severity; 8] = [
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// Numeric rank, as emitted in the `level` field of rendered documents.
    pub fn rank(self) -> u16 {
        match self {
            Severity::Debug => 100,
            Severity::Info => 200,
            Severity::Notice => 250,
            Severity::Warning => 300,
            Severity::Error => 400,
            Severity::Critical => 500,
            Severity::Alert => 550,
            Severity::Emergency => 600,
        }
    }

    /// Canonical name, used for `level_name` and the `level:<name>` tag.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }

    pub fn from_rank(rank: u16) -> Option<Severity> {
        Severity::ALL.into_iter().find(|s| s.rank() == rank)
    }

    /// Case-insensitive lookup by canonical name.
    pub fn from_name(name: &str) -> Option<Severity> {
        Severity::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Datadog status for this severity.
    pub fn status(self) -> Status {
        match self {
            Severity::Debug | Severity::Info => Status::Info,
            Severity::Notice | Severity::Warning => Status::Warning,
            Severity::Error | Severity::Critical | Severity::Alert | Severity::Emergency => {
                Status::Error
            }
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown severity: {0}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::from_name(s).ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::INFO => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

/// Coarse Datadog classification of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Info,
    Warning,
    Error,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Info => "info",
            Status::Warning => "warning",
            Status::Error => "error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_table_covers_every_severity() {
        let expected = [
            (100, Status::Info),
            (200, Status::Info),
            (250, Status::Warning),
            (300, Status::Warning),
            (400, Status::Error),
            (500, Status::Error),
            (550, Status::Error),
            (600, Status::Error),
        ];

        for (rank, status) in expected {
            let severity = Severity::from_rank(rank).expect("canonical rank");
            assert_eq!(severity.status(), status, "rank {rank}");
        }
        assert_eq!(Severity::ALL.len(), expected.len());
    }

    #[test]
    fn ranks_are_strictly_ascending() {
        let ranks: Vec<u16> = Severity::ALL.iter().map(|s| s.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
        assert!(Severity::Debug < Severity::Emergency);
    }

    #[test]
    fn unknown_rank_is_rejected() {
        assert_eq!(Severity::from_rank(0), None);
        assert_eq!(Severity::from_rank(350), None);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("warning".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!(" CRITICAL ".parse::<Severity>(), Ok(Severity::Critical));
        assert!("verbose".parse::<Severity>().is_err());
    }

    #[test]
    fn maps_tracing_levels() {
        assert_eq!(Severity::from(tracing::Level::TRACE), Severity::Debug);
        assert_eq!(Severity::from(tracing::Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(tracing::Level::ERROR), Severity::Error);
    }
}
