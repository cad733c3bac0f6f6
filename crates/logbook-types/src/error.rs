use thiserror::Error;

/// Failure taxonomy shared by every component. Stores and the directory
/// client surface these unmodified; nothing is swallowed except logout,
/// which is best-effort by contract.
#[derive(Debug, Error)]
pub enum Error {
    /// The directory rejected the supplied credential. Not retryable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("username already registered")]
    DuplicateIdentity,

    /// The directory could not be reached. Retryable, and deliberately
    /// distinct from a credential rejection.
    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("users are not friends")]
    NotFriends,

    #[error("invalid payload: {0}")]
    InvalidPayload(&'static str),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
