//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
///
/// Raised for caller bugs (empty origin, malformed address) and never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Failures reported by the bus transport and the brokers behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Worth retrying: dropped connection, timeout, refused connection.
    #[error("Transient transport failure: {0}")]
    Transient(String),

    /// Permanent, or transient failures that outlived the retry budget.
    #[error("Transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    pub fn transient(message: impl Into<String>) -> Self {
        TransportError::Transient(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        TransportError::Unavailable(message.into())
    }

    /// Returns true if the operation may succeed when retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Transient(_))
    }
}

/// Inbound bytes that could not be turned into an envelope.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid envelope: {0}")]
    Invalid(#[from] ValidationError),
}

/// Failure reported by an event handler.
///
/// Isolated by the dispatch registry: logged, never propagated past it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("payload decode failed: {}", err))
    }
}

/// Errors surfaced to callers publishing on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl BusError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            BusError::Validation(_) => "INVALID_ARGUMENT",
            BusError::Transport(TransportError::Transient(_)) => "TRANSPORT_TRANSIENT",
            BusError::Transport(TransportError::Unavailable(_)) => "TRANSPORT_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("origin_service");
        assert_eq!(format!("{}", err), "Field 'origin_service' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("destination", "too many ':' separators");
        assert_eq!(
            format!("{}", err),
            "Field 'destination' has invalid format: too many ':' separators"
        );
    }

    #[test]
    fn only_transient_errors_are_retryable() {
        assert!(TransportError::transient("reset").is_transient());
        assert!(!TransportError::unavailable("gone").is_transient());
    }

    #[test]
    fn decode_error_wraps_json_errors() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DecodeError = json_err.into();
        assert!(format!("{}", err).starts_with("Malformed envelope"));
    }

    #[test]
    fn bus_error_codes() {
        let err: BusError = ValidationError::empty_field("event_type").into();
        assert_eq!(err.code(), "INVALID_ARGUMENT");

        let err: BusError = TransportError::unavailable("down").into();
        assert_eq!(err.code(), "TRANSPORT_UNAVAILABLE");
        assert_eq!(format!("{}", err), "Transport unavailable: down");
    }
}
