/// Result alias used throughout the crate.
pub type NavTrackResult<T> = Result<T, NavTrackError>;

#[derive(thiserror::Error, Debug)]
/// Errors surfaced to callers of the navtrack core.
pub enum NavTrackError {
    /// Seed sampling found too few navigable points to build a seed graph.
    #[error("insufficient seeds: sampled {found}, need at least {required}")]
    InsufficientSeeds {
        /// Seeds actually sampled.
        found: usize,
        /// Minimum needed.
        required: usize,
    },

    /// A spawn point was requested from a region with no points.
    #[error("cannot select a spawn point from an empty region")]
    EmptyRegion,

    /// Invalid configuration or input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Region cache storage failure.
    #[error("cache error: {0}")]
    Cache(String),

    /// JSON encode/decode failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NavTrackError {
    /// Build a [`NavTrackError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NavTrackError::Cache`].
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Build a [`NavTrackError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for NavTrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// Why one behavior produced no segment.
///
/// These never reach the caller: the executor logs them and counts them against its
/// consecutive-failure budget.
pub enum BehaviorFailure {
    /// No destination far enough from the current position was found.
    #[error("no candidate destination after {tries} tries")]
    NoCandidate {
        /// Destination draws spent.
        tries: u32,
    },

    /// Destinations were found but none had a usable path.
    #[error("no path to any candidate after {tries} tries")]
    PathNotFound {
        /// Destination draws spent.
        tries: u32,
    },

    /// The clear distance ahead is below the translate minimum.
    #[error("obstacle too close: {clear:.1} clear, need {min:.1}")]
    ObstacleTooClose {
        /// Distance available before the safety margin.
        clear: f64,
        /// Configured minimum.
        min: f64,
    },

    /// The behavior would last zero frames.
    #[error("behavior rounds to zero frames")]
    ZeroDuration,

    /// The produced segment broke its own shape invariant.
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
