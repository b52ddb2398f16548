use serde::Serialize;

use crate::notify::error::NotifyError;

/// Normalized result of a single dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Delivered,
    Failed { reason: String },
}

impl DispatchOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Delivered => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

impl From<NotifyError> for DispatchOutcome {
    fn from(err: NotifyError) -> Self {
        Self::failed(err.to_string())
    }
}

impl From<Result<(), NotifyError>> for DispatchOutcome {
    fn from(result: Result<(), NotifyError>) -> Self {
        match result {
            Ok(()) => Self::Delivered,
            Err(err) => err.into(),
        }
    }
}
