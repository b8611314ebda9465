use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Missing id, or an id that belongs to another couple.
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Task already completed: {0}")]
    TaskAlreadyCompleted(String),

    #[error("Invalid recurrence rule: {0}")]
    InvalidRRule(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// The closed set of error kinds callers switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    AlreadyExists,
    TaskAlreadyCompleted,
    InvalidRRule,
    InvalidInput,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::AlreadyExists => "ALREADY_EXISTS",
            ErrorKind::TaskAlreadyCompleted => "TASK_ALREADY_COMPLETED",
            ErrorKind::InvalidRRule => "INVALID_RRULE",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound(_) => ErrorKind::NotFound,
            CoreError::Unauthorized(_) => ErrorKind::Unauthorized,
            CoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            CoreError::TaskAlreadyCompleted(_) => ErrorKind::TaskAlreadyCompleted,
            CoreError::InvalidRRule(_) => ErrorKind::InvalidRRule,
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::Database(_) | CoreError::Migration(_) | CoreError::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Returns true when a database error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
