use thiserror::Error;

/// Errors returned by the RA engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RadvError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A setter was called while advertisements are active.
    #[error("Router advertisements are running, stop them first")]
    Busy,

    #[error("No event loop attached")]
    NotBound,

    #[error("An event loop is already attached")]
    AlreadyBound,

    /// RFC 4191 §2.2: a zero router lifetime requires medium preference.
    #[error("Router lifetime 0 requires medium router preference")]
    PreferenceConflict,

    #[error("IPv6 prefix {existing} already configured, ignoring {candidate}")]
    AlreadyExists { existing: String, candidate: String },

    #[error("Out of memory")]
    OutOfMemory,
}

pub type RadvResult<T> = Result<T, RadvError>;
