//! Validation errors for identifier construction.
//!
//! Every variant names the offending field so callers can surface a
//! localized, specific message before any network access happens.

/// Errors raised when an identifier fails format validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required field was empty or absent.
    #[error("{0} must not be empty")]
    Missing(&'static str),

    /// Business registration number is not exactly 10 digits.
    #[error("invalid business registration number (expected 10 digits): {0}")]
    InvalidCorpNum(String),

    /// Collection job ID is not exactly 18 characters.
    #[error("invalid job ID (expected 18 characters): {0}")]
    InvalidJobId(String),

    /// NTS confirmation number is not exactly 24 characters.
    #[error("invalid NTS confirmation number (expected 24 characters): {0}")]
    InvalidConfirmNum(String),

    /// Date is not a real calendar date in `YYYYMMDD` form.
    #[error("invalid date (expected YYYYMMDD): {0}")]
    InvalidDate(String),
}

impl ValidationError {
    /// The name of the field this error refers to, for error reporting.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing(field) => field,
            Self::InvalidCorpNum(_) => "CorpNum",
            Self::InvalidJobId(_) => "JobID",
            Self::InvalidConfirmNum(_) => "NTSConfirmNum",
            Self::InvalidDate(_) => "Date",
        }
    }
}
