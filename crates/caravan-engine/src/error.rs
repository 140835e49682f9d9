//! Error types for the caravan engine.

/// Errors that can occur while deriving or acting on a caravan.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A traveler's role is not in the role registry.
    #[error("unknown traveler role '{role}' on traveler \"{traveler}\"")]
    UnknownTravelerRole {
        /// The unrecognised role id.
        role: String,
        /// Name of the offending traveler.
        traveler: String,
    },

    /// A wagon's type is not in the wagon-type registry.
    #[error("unknown wagon type '{wagon_type}' on wagon \"{wagon}\"")]
    UnknownWagonType {
        /// The unrecognised wagon type id.
        wagon_type: String,
        /// Name of the offending wagon.
        wagon: String,
    },

    /// A change formula could not be parsed or evaluated.
    #[error("formula error in `{formula}`: {message}")]
    Formula {
        /// The formula text.
        formula: String,
        /// What went wrong.
        message: String,
    },

    /// A statistic test was requested for an attribute that cannot be tested.
    #[error("invalid attribute for a test: {0}")]
    InvalidAttribute(String),

    /// A registry entry was malformed.
    #[error("invalid registry entry: {0}")]
    InvalidRegistry(String),

    /// Document-level failure.
    #[error("{0}")]
    Core(#[from] caravan_core::CoreError),
}

/// Convenience result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
