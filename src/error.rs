//! Error types.
//!
//! Failures inside the engine are scoped to the smallest unit they affect (one
//! region, one riding, one lookup) and carry their own enum. `AppError` is what
//! the binary sees: a message plus the process exit code.

/// Top-level error returned by `app::run`.
///
/// Exit codes:
/// - `2`: configuration or input-file problem
/// - `3`: nothing left to compute
/// - `4`: failed to write an output
#[derive(Clone, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

/// A region's poll input cannot be aggregated. The region is skipped; other
/// regions are unaffected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegionError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("no processable polls after cleaning")]
    NoProcessableRows,
}

/// A riding (or the whole projection batch) cannot be projected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("no historical data available for riding {0}")]
    NoBaseline(String),
    #[error("no national vote shares recorded for {0}")]
    MissingNationalYear(u16),
    #[error("no riding has historical results in any candidate year")]
    NoBaselines,
}

/// A read-only lookup key is not known.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LookupError {
    #[error("Region '{0}' not found.")]
    UnknownRegion(String),
    #[error("Riding '{0}' not found.")]
    UnknownRiding(String),
    #[error("No data available for region '{0}'.")]
    NoData(String),
}

impl From<ProjectionError> for AppError {
    fn from(err: ProjectionError) -> Self {
        AppError::new(3, err.to_string())
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        AppError::new(2, err.to_string())
    }
}
