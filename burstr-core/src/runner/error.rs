pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("at least one target URL is required")]
    NoTargets,

    #[error("duplicate target: `{0}`")]
    DuplicateTarget(String),

    #[error("invalid target `{url}`: {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("`requests` must be a positive integer")]
    InvalidRequests,

    #[error("`timeout` must be a positive duration")]
    InvalidTimeout,

    #[error("`rate_window` must be a positive duration")]
    InvalidRateWindow,

    #[error("`report_interval` must be a positive duration")]
    InvalidReportInterval,

    #[error("completion channel closed after {received} of {expected} workers")]
    CompletionChannelClosed { expected: u64, received: u64 },
}
