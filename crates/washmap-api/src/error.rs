use thiserror::Error;

/// Errors returned by the car-wash service gateway.
///
/// Each variant maps onto one branch of the client's failure taxonomy:
/// transport failure, non-success status, explicit error payload, or a body
/// that does not match the expected shape. There is no retry machinery —
/// every failure is terminal for that attempt and the caller decides whether
/// to repeat the action.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx status with no usable `{"error": ...}` payload.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The service answered with an explicit `{"error": ...}` body; the
    /// message is surfaced verbatim to the user.
    #[error("{0}")]
    Api(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A mutating request was attempted before the server ever set the
    /// `csrftoken` cookie. Checked before any network I/O happens.
    #[error("no csrftoken cookie present; load any page from the service first")]
    MissingCsrfToken,

    /// Token store I/O failure (the mobile-style persisted login token).
    #[error("token store error at {path}: {source}")]
    TokenStore {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
