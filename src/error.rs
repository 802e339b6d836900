use thiserror::Error;

/// Failures surfaced while building the experience.
///
/// Runtime recoveries (missing canvases, degenerate regions, re-arming an
/// armed scheduler) never produce one of these; they are logged and skipped.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("ease factor must lie in (0, 1), got {0}")]
    Ease(f64),

    #[error("fps history capacity must be at least 1")]
    HistoryCapacity,

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("window fraction {0} outside [0, 1]")]
    WindowFraction(f64),

    #[error("unknown log level `{0}`")]
    LogLevel(String),

    #[error("graphics host: {0}")]
    Graphics(String),

    #[error("element `{0}` not found")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, Error>;
