//! Error types for the cart client.
//!
//! # Design
//! Two layers. `ApiError` is what the sans-IO `CartClient` can report on its
//! own: a rejected response or a payload that failed to (de)serialize.
//! `CartOperationFailed` is what `CartSession` surfaces to callers: the
//! operation tag plus either a transport failure or an `ApiError`. The cart
//! service is opaque, so every non-2xx status is one `ServiceRejection`.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::types::Operation;

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection, DNS or I/O failure reported by the transport.
    #[error("cart service unreachable: {0}")]
    Unreachable(String),

    /// No response within the configured request timeout.
    #[error("no response from cart service after {after:?}")]
    TimedOut { after: Duration },
}

/// The cart service answered with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cart service rejected the request with HTTP {status}: {body}")]
pub struct ServiceRejection {
    pub status: u16,
    pub body: String,
}

impl ServiceRejection {
    /// Human-readable reason from a JSON error body, if there is one.
    ///
    /// Looks at `description`, then `message`, then `error`.
    pub fn description(&self) -> Option<String> {
        let json: Value = serde_json::from_str(&self.body).ok()?;
        ["description", "message", "error"]
            .iter()
            .find_map(|key| json.get(key).and_then(Value::as_str))
            .map(str::to_string)
    }
}

/// Errors reported by `CartClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Rejected(#[from] ServiceRejection),

    /// A 2xx response whose body is not JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),
}

/// Underlying reason a cart operation failed.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// The error every `CartSession` operation surfaces.
#[derive(Debug, Error)]
#[error("cart {operation} failed: {cause}")]
pub struct CartOperationFailed {
    pub operation: Operation,
    #[source]
    pub cause: FailureCause,
}

impl CartOperationFailed {
    pub fn new(operation: Operation, cause: impl Into<FailureCause>) -> Self {
        Self {
            operation,
            cause: cause.into(),
        }
    }

    /// True when no response was ever obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self.cause, FailureCause::Transport(_))
    }

    /// The service's rejection, when the failure was a non-2xx response.
    pub fn rejection(&self) -> Option<&ServiceRejection> {
        match &self.cause {
            FailureCause::Api(ApiError::Rejected(rejection)) => Some(rejection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_description_prefers_description_field() {
        let rejection = ServiceRejection {
            status: 422,
            body: r#"{"status":422,"message":"Cart Error","description":"Sold out"}"#.to_string(),
        };
        assert_eq!(rejection.description().as_deref(), Some("Sold out"));
    }

    #[test]
    fn rejection_description_falls_back_to_error_field() {
        let rejection = ServiceRejection {
            status: 422,
            body: r#"{"error":"invalid"}"#.to_string(),
        };
        assert_eq!(rejection.description().as_deref(), Some("invalid"));
    }

    #[test]
    fn rejection_description_of_plain_text_is_none() {
        let rejection = ServiceRejection {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert!(rejection.description().is_none());
    }

    #[test]
    fn operation_failure_exposes_rejection() {
        let err = CartOperationFailed::new(
            Operation::Update,
            ApiError::Rejected(ServiceRejection {
                status: 422,
                body: "{}".to_string(),
            }),
        );
        assert!(!err.is_transport());
        assert_eq!(err.rejection().map(|r| r.status), Some(422));
        assert!(err.to_string().starts_with("cart update failed"));
    }

    #[test]
    fn operation_failure_from_transport() {
        let err = CartOperationFailed::new(
            Operation::Add,
            TransportError::Unreachable("connection refused".to_string()),
        );
        assert!(err.is_transport());
        assert!(err.rejection().is_none());
        assert_eq!(
            err.to_string(),
            "cart add failed: cart service unreachable: connection refused"
        );
    }
}
