use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstervizError {
    #[error("Invalid date (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS): {0}")]
    InvalidDate(String),

    #[error("Invalid step expression (expected e.g. 1d or 6h): {0}")]
    InvalidStep(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParams(String),

    #[error("Unsupported orbit for elliptic propagation: {0}")]
    UnsupportedOrbit(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Catalog store error: {0}")]
    Store(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for AstervizError {
    fn eq(&self, other: &Self) -> bool {
        use AstervizError::*;
        match (self, other) {
            (InvalidDate(a), InvalidDate(b)) => a == b,
            (InvalidStep(a), InvalidStep(b)) => a == b,
            (MissingParameter(a), MissingParameter(b)) => a == b,
            (InvalidParams(a), InvalidParams(b)) => a == b,
            (UnsupportedOrbit(a), UnsupportedOrbit(b)) => a == b,
            (ObjectNotFound(a), ObjectNotFound(b)) => a == b,
            (UnknownCategory(a), UnknownCategory(b)) => a == b,
            (Store(a), Store(b)) => a == b,

            // Wrapped library errors are not comparable: same variant is enough
            (Csv(_), Csv(_)) => true,
            (Json(_), Json(_)) => true,
            (Io(_), Io(_)) => true,

            _ => false,
        }
    }
}

#[cfg(test)]
mod asterviz_errors_test {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let err: AstervizError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, AstervizError::Io(_)));
        assert_eq!(
            err,
            AstervizError::Io(std::io::Error::other("any payload"))
        );
        assert_ne!(err, AstervizError::Store("gone".into()));
    }
}
