/// Errors surfaced by the authentication and authorization layer.
///
/// `InvalidCredentials` is deliberately generic: it never distinguishes an
/// unknown login key from a wrong password.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("this account is inactive")]
    AccountDisabled,
    #[error("failed to generate session token: {0}")]
    TokenGeneration(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors from the file-backed record and identity stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create record directory: {0}")]
    RecordDirCreation(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("referenced record does not exist: {0}")]
    MissingReference(String),
    #[error("identifier must be 32 lowercase hex characters without hyphens, got: '{0}'")]
    InvalidRecordId(String),
    #[error("a user with login key '{0}' already exists")]
    DuplicateUser(String),
    #[error("failed to hash password: {0}")]
    PasswordHash(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
