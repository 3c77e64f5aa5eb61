//! Identity parsing errors

/// Errors raised while parsing or building identities
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Module name segment is empty
    #[error("module identity has an empty name")]
    EmptyName,

    /// A `key=value` attribute could not be split
    #[error("malformed module attribute: {0:?}")]
    MalformedAttribute(String),

    /// Attribute key is not one of Version, Culture, PublicKeyToken
    #[error("unknown module attribute: {0:?}")]
    UnknownAttribute(String),

    /// Same attribute given twice
    #[error("duplicate module attribute: {0}")]
    DuplicateAttribute(&'static str),

    /// Version is not four dot-separated 16-bit numbers
    #[error("invalid module version: {0:?}")]
    InvalidVersion(String),

    /// Public key token is not 8 hex-encoded bytes
    #[error("invalid public key token: {0:?}")]
    InvalidPublicKeyToken(String),

    /// Token text is not a decimal or `0x` hex 32-bit integer
    #[error("invalid function token: {0:?}")]
    InvalidToken(String),
}
