//! Error types for the analysis engine.
//!
//! The engine raises no errors for empty inputs: no meals, no symptoms, or an
//! empty catalog all resolve to `0.0` scores or empty rankings. Errors come
//! from bad parameters or from the collaborators, and collaborator errors are
//! passed through as-is so "no data" is never reported as "no risk".

use crate::source::SourceError;

/// Errors returned by the analysis operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    /// A user or food does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up (`"user"`, `"food"`).
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A caller-supplied parameter is outside its valid range.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Explanation of what is wrong with the parameter.
        reason: String,
    },

    /// The event store or food catalog could not serve the request.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Description of the collaborator failure.
        message: String,
    },
}

impl AnalysisError {
    /// Shorthand for [`AnalysisError::InvalidParameter`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}

impl From<SourceError> for AnalysisError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::NotFound { entity, id } => Self::NotFound { entity, id },
            SourceError::Unavailable { message } => Self::UpstreamUnavailable { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_errors_keep_their_details() {
        let not_found = AnalysisError::from(SourceError::NotFound {
            entity: "user",
            id: String::from("42"),
        });
        assert_eq!(
            not_found,
            AnalysisError::NotFound {
                entity: "user",
                id: String::from("42"),
            }
        );

        let down = AnalysisError::from(SourceError::Unavailable {
            message: String::from("connection refused"),
        });
        assert_eq!(down.to_string(), "upstream unavailable: connection refused");
    }
}
