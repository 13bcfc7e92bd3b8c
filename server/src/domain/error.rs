use thiserror::Error;

/// Failures raised before any statement is executed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A request parameter is missing or invalid
    #[error("{message}")]
    Validation { code: &'static str, message: String },

    /// No region, species or record matches the request
    #[error("{message}")]
    NotFound { code: &'static str, message: String },
}

impl DomainError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }
}
