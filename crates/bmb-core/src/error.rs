use thiserror::Error;

/// Core error type for BMB operations.
#[derive(Error, Debug)]
pub enum BmbError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Project already exists: {0}")]
    ProjectExists(String),

    #[error("Not a BMB project: {0}")]
    NotAProject(String),

    #[error("External tool failed: {0}")]
    ExternalTool(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BmbError {
    /// HTTP status code this error maps to at the route boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            BmbError::Validation(_) => 400,
            BmbError::Unauthorized(_) => 401,
            BmbError::Forbidden(_) => 403,
            BmbError::NotFound(_) => 404,
            BmbError::Conflict(_) | BmbError::ProjectExists(_) => 409,
            _ => 500,
        }
    }

    /// Short machine-readable code used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            BmbError::Validation(_) => "VALIDATION_ERROR",
            BmbError::Unauthorized(_) => "UNAUTHORIZED",
            BmbError::Forbidden(_) => "FORBIDDEN",
            BmbError::NotFound(_) => "NOT_FOUND",
            BmbError::Conflict(_) | BmbError::ProjectExists(_) => "CONFLICT",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for BmbError {
    fn from(e: serde_json::Error) -> Self {
        BmbError::Serialization(e.to_string())
    }
}

/// Result type alias using BmbError.
pub type Result<T> = std::result::Result<T, BmbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(BmbError::Validation("x".into()).status_code(), 400);
        assert_eq!(BmbError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(BmbError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(BmbError::NotFound("x".into()).status_code(), 404);
        assert_eq!(BmbError::Conflict("x".into()).status_code(), 409);
        assert_eq!(BmbError::Internal("x".into()).status_code(), 500);
        assert_eq!(BmbError::Template("x".into()).status_code(), 500);
    }

    #[test]
    fn test_project_exists_message() {
        let err = BmbError::ProjectExists("myapp".into());
        assert!(err.to_string().contains("already exists"));
    }
}
