use thiserror::Error;

/// Main error type for the Cogneato client
#[derive(Error, Debug)]
pub enum CgError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("Table error: {0}")]
    Table(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while parsing column specifiers or converting between
/// parameter dictionaries and positional rows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Invalid column specifier '{spec}': {message}")]
    InvalidSpecifier { spec: String, message: String },

    #[error("Duplicate parameter name: {name}")]
    DuplicateName { name: String },

    #[error("Missing parameter: {name}")]
    MissingParameter { name: String },

    #[error("Cannot coerce value {value} for parameter '{name}': {message}")]
    Coercion {
        name: String,
        value: String,
        message: String,
    },

    #[error("Row has {actual} values, schema needs at least {expected}")]
    RowLength { expected: usize, actual: usize },
}

/// Errors from one request/response exchange with the remote service.
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Request failed code = {last_status} after {attempts} attempts")]
    RetriesExhausted { attempts: u32, last_status: u16 },

    #[error("Invalid response {body}")]
    MalformedResponse { body: String },

    /// Display is the server's message, verbatim.
    #[error("{0}")]
    ServerReported(String),

    #[error("HTTP request failed: {0}")]
    Http(String),
}

/// Result type alias for client operations
pub type CgResult<T> = Result<T, CgError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::CgError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::CgError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_verbatim() {
        let error: CgError = ExchangeError::ServerReported("Bad input: too many arms".into()).into();
        assert_eq!(error.to_string(), "Bad input: too many arms");
    }

    #[test]
    fn test_retries_exhausted_reports_status() {
        let error = ExchangeError::RetriesExhausted {
            attempts: 3,
            last_status: 500,
        };
        assert!(error.to_string().contains("500"));
        assert!(error.to_string().contains("3 attempts"));
    }

    #[test]
    fn test_error_conversion() {
        let schema_error = SchemaError::MissingParameter {
            name: "x".to_string(),
        };
        let cg_error: CgError = schema_error.into();

        match cg_error {
            CgError::Schema(SchemaError::MissingParameter { name }) => assert_eq!(name, "x"),
            _ => panic!("Expected Schema error"),
        }
    }

    #[test]
    fn test_macros() {
        let validation_err = validation_error!("got {} phis for {} params", 2, 3);
        assert!(matches!(validation_err, CgError::Validation(_)));
        let config_err = config_error!("num_retries must be at least 1");
        assert_eq!(
            config_err.to_string(),
            "Configuration error: num_retries must be at least 1"
        );
    }
}
