use thiserror::Error;

use crate::domain::customer::CustomerId;

pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected internal error occurred.";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CustomerError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String, details: Vec<String> },
    #[error("Customer not found with ID: {0}")]
    NotFound(CustomerId),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, details: Vec<String> },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl InterfaceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict { .. } => 409,
            Self::Internal { .. } => 500,
        }
    }

    /// HTTP reason phrase used as the `error` field of the response body.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Bad Request",
            Self::NotFound { .. } => "Not Found",
            Self::Conflict { .. } => "Conflict",
            Self::Internal { .. } => "Internal Server Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::NotFound { message }
            | Self::Conflict { message }
            | Self::Internal { message } => message,
        }
    }

    pub fn details(&self) -> &[String] {
        match self {
            Self::BadRequest { details, .. } => details,
            _ => &[],
        }
    }
}

impl From<CustomerError> for InterfaceError {
    fn from(value: CustomerError) -> Self {
        match value {
            CustomerError::InvalidInput { message, details } => {
                Self::BadRequest { message, details }
            }
            not_found @ CustomerError::NotFound(_) => {
                Self::NotFound { message: not_found.to_string() }
            }
            CustomerError::ConstraintViolation(message) => Self::Conflict { message },
            CustomerError::Unexpected(_) => {
                Self::Internal { message: INTERNAL_ERROR_MESSAGE.to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::customer::CustomerId;
    use crate::errors::{CustomerError, InterfaceError, INTERNAL_ERROR_MESSAGE};

    #[test]
    fn invalid_input_maps_to_bad_request_with_details() {
        let interface = InterfaceError::from(CustomerError::InvalidInput {
            message: "Validation failed.".to_owned(),
            details: vec!["Email is required.".to_owned()],
        });

        assert_eq!(interface.status_code(), 400);
        assert_eq!(interface.label(), "Bad Request");
        assert_eq!(interface.details(), &["Email is required.".to_owned()]);
    }

    #[test]
    fn not_found_message_names_the_id() {
        let id = CustomerId::new();
        let interface = InterfaceError::from(CustomerError::NotFound(id));

        assert_eq!(interface.status_code(), 404);
        assert_eq!(interface.message(), format!("Customer not found with ID: {id}"));
    }

    #[test]
    fn constraint_violation_maps_to_conflict() {
        let interface = InterfaceError::from(CustomerError::ConstraintViolation(
            "email address already in use".to_owned(),
        ));

        assert_eq!(interface.status_code(), 409);
        assert_eq!(interface.label(), "Conflict");
    }

    #[test]
    fn unexpected_failure_hides_the_cause() {
        let interface =
            InterfaceError::from(CustomerError::Unexpected("disk I/O error".to_owned()));

        assert_eq!(interface.status_code(), 500);
        assert_eq!(interface.message(), INTERNAL_ERROR_MESSAGE);
        assert!(interface.details().is_empty());
    }
}
