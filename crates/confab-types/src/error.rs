use thiserror::Error;

/// Errors from persistence gateway operations (used by the trait
/// definitions in confab-core).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(String),

    #[error("server returned {code}: {body}")]
    Status { code: u16, body: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("chat not found")]
    NotFound,
}

/// Validation failures from the send flow.
///
/// These are the only errors the send flow surfaces to the caller; gateway
/// and completion failures are resolved internally (refresh, rollback, or a
/// synthetic transcript message) per the reconciliation rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("send declined by user")]
    Declined,

    #[error("could not create a chat session")]
    SessionCreationFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Status {
            code: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "server returned 500: boom");
    }

    #[test]
    fn test_send_error_display() {
        assert_eq!(SendError::EmptyMessage.to_string(), "message is empty");
        assert_eq!(SendError::Declined.to_string(), "send declined by user");
    }
}
