//! Error types for the panshare library.

use thiserror::Error;

use crate::api::ApiErrno;

/// Boxed transport error, so any [`Transport`](crate::http::Transport) can report failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Longest response excerpt kept in an error.
const EXCERPT_LIMIT: usize = 256;

/// Why one upstream exchange was rejected.
#[derive(Error, Debug)]
pub enum Rejection {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// Upstream answered with a non-200 status.
    #[error("HTTP status {status}: {excerpt}")]
    HttpStatus { status: u16, excerpt: String },

    /// Upstream answered 200 but the envelope carried a non-zero errno.
    #[error("errno {errno} ({}): {excerpt}", .errno_kind.description())]
    Api {
        status: u16,
        errno: i64,
        errno_kind: ApiErrno,
        excerpt: String,
    },

    /// The body could not be decoded.
    #[error("malformed response ({source}): {excerpt}")]
    Malformed {
        #[source]
        source: serde_json::Error,
        excerpt: String,
    },

    /// A required field was absent or empty.
    #[error("missing {field}: {excerpt}")]
    MissingField {
        field: &'static str,
        excerpt: String,
    },
}

impl Rejection {
    /// HTTP status attached to this rejection, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Rejection::HttpStatus { status, .. } | Rejection::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream errno, when the envelope was decoded.
    pub fn errno(&self) -> Option<i64> {
        match self {
            Rejection::Api { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}

/// Main error type for panshare operations.
#[derive(Error, Debug)]
pub enum ShareError {
    /// The cookie string has no `BDUSS` entry.
    #[error("BDUSS not found in cookie")]
    CredentialExtraction,

    /// The identity endpoint did not yield a user id.
    #[error("failed to resolve user id: {0}")]
    IdentityResolution(#[source] Rejection),

    /// The session-key endpoint did not yield an encrypted key.
    #[error("failed to obtain session key: {0}")]
    SessionKey(#[source] Rejection),

    /// The encrypted session key was not valid base64.
    #[error("failed to decrypt session key: {0}")]
    Decryption(#[from] base64::DecodeError),

    /// The share could not be opened.
    #[error("failed to access share: {0}")]
    ShareAccess(#[source] Rejection),

    /// The share root listed no entries. Upstream answers the same way for a
    /// wrong password, so this also covers denied access.
    #[error("share content is empty or inaccessible")]
    EmptyShare,

    /// A directory listing page failed.
    #[error("failed to list directory: {0}")]
    Listing(#[source] Rejection),

    /// The download-link endpoint failed.
    #[error("download link request failed: {0}")]
    LinkApi(#[source] Rejection),

    /// The download-link endpoint answered without a usable link.
    #[error("dlink not found in response: {0}")]
    EmptyLinkList(String),

    /// A signed request was attempted before the session was bootstrapped.
    #[error("missing personal info (BDUSS, UID, SK) to calculate rand")]
    MissingCredentials,

    /// A checksum did not satisfy the codec's input format.
    #[error("invalid checksum {value:?}: {reason}")]
    Checksum { value: String, reason: &'static str },

    /// The caller's cancellation token fired while a request was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// The request deadline elapsed.
    #[error("request timed out")]
    TimedOut,

    /// The HTTP client could not be built.
    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// Result type alias for panshare operations.
pub type Result<T> = std::result::Result<T, ShareError>;

/// Truncate a response body for inclusion in an error.
pub(crate) fn excerpt(body: &str) -> String {
    if body.len() <= EXCERPT_LIMIT {
        return body.to_string();
    }
    let mut end = EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
