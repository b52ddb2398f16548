use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid endpoint descriptor format")]
    Parse,
    #[error("Unsupported notification scheme: {scheme}. Supported: {supported}")]
    UnsupportedScheme { scheme: String, supported: String },
    #[error("{message}")]
    Validation { message: String },
    #[error("{backend} error: {status}{}", detail_suffix(.detail))]
    Delivery {
        backend: &'static str,
        status: u16,
        detail: String,
    },
    #[error("{message}")]
    Network { message: String },
    #[error("timeout")]
    Timeout,
}

impl NotifyError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Coarse classification used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse | Self::UnsupportedScheme { .. } => "parse",
            Self::Validation { .. } => "validation",
            Self::Delivery { .. } => "delivery",
            Self::Network { .. } => "network",
            Self::Timeout => "timeout",
        }
    }

    /// True when the failure was detected before any network I/O.
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            Self::Parse | Self::UnsupportedScheme { .. } | Self::Validation { .. }
        )
    }
}

fn detail_suffix(detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        String::new()
    } else {
        format!(" {detail}")
    }
}
