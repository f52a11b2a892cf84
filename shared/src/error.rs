use thiserror::Error;

use crate::labels;

/// The initial dataset fetch failed. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataLoadFailure {
    #[error("fetch error: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
}

impl DataLoadFailure {
    /// Localized banner text. Identical for every variant; the variant detail
    /// only goes to the console.
    pub const fn user_message(&self) -> &'static str {
        labels::LOAD_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::DataLoadFailure;
    use crate::labels;

    #[test]
    fn every_failure_maps_to_the_same_banner() {
        for failure in [
            DataLoadFailure::Transport("offline".into()),
            DataLoadFailure::Status(502),
            DataLoadFailure::Parse("expected value".into()),
        ] {
            assert_eq!(failure.user_message(), labels::LOAD_FAILED);
        }
    }

    #[test]
    fn display_keeps_diagnostic_detail() {
        assert_eq!(DataLoadFailure::Status(404).to_string(), "HTTP 404");
        assert_eq!(
            DataLoadFailure::Transport("offline".into()).to_string(),
            "fetch error: offline"
        );
    }
}
