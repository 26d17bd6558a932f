use std::fmt;

#[derive(Debug)]
pub enum CatalogError {
    /// The requested catalog object does not exist.
    NotFound(String),
    /// The server rejected the credentials (HTTP 401).
    Unauthorized,
    /// The authenticated user lacks permission (HTTP 403).
    Forbidden,
    /// Connection-level failure (DNS, TLS, timeout, refused).
    Transport(String),
    /// The server rejected a write because of a version conflict (HTTP 409).
    Conflict(String),
    /// Any other unexpected HTTP status.
    Http(u16, String),
    /// Response body could not be deserialized.
    Parse(String),
    /// Policy file is malformed.
    Policy(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {what}"),
            Self::Unauthorized => write!(f, "authentication failed (401)"),
            Self::Forbidden => write!(f, "permission denied (403)"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Conflict(msg) => write!(f, "version conflict: {msg}"),
            Self::Http(status, body) => write!(f, "unexpected HTTP status {status}: {body}"),
            Self::Parse(msg) => write!(f, "malformed response: {msg}"),
            Self::Policy(msg) => write!(f, "policy file error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}
