use crate::forms::FieldErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Rejected before anything was sent.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] shared::Error),

    #[error("authentication failed: {0}")]
    AuthenticationFailed(#[source] shared::Error),
}

impl DashboardError {
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            DashboardError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for DashboardError {
    fn from(errors: FieldErrors) -> Self {
        DashboardError::Validation(errors)
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
