#![forbid(unsafe_code)]

use ht_core::history::AncestorChainError;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    Serde(serde_json::Error),
    InvalidRequest(&'static str),
    ConditionFailed {
        op: &'static str,
        detail: String,
    },
    Corrupted {
        detail: String,
    },
    RowCount {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Sql(_) | Self::Serde(_) => "INTERNAL",
            Self::Corrupted { .. } | Self::RowCount { .. } => "INTERNAL",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ConditionFailed { .. } => "CONDITION_FAILED",
        }
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::Serde(err) => write!(f, "serde: {err}"),
            Self::InvalidRequest(message) => write!(f, "invalid request: {message}"),
            Self::ConditionFailed { op, detail } => {
                write!(f, "condition failed in {op}: {detail}")
            }
            Self::Corrupted { detail } => write!(f, "corrupted history data: {detail}"),
            Self::RowCount {
                table,
                expected,
                actual,
            } => write!(
                f,
                "expected {expected} row(s) to be affected for {table}, got {actual}"
            ),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

impl From<AncestorChainError> for StoreError {
    fn from(value: AncestorChainError) -> Self {
        Self::Corrupted {
            detail: value.to_string(),
        }
    }
}
