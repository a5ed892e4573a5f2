//! Error types for volleystat.
//!
//! This module defines all error types used throughout the volleystat crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for volleystat operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Roster Errors ===
    /// A player with this jersey number is already on the roster.
    #[error("jersey #{jersey} is already taken by {name}")]
    DuplicateJersey {
        /// The conflicting jersey number.
        jersey: u16,
        /// Name of the player already wearing it.
        name: String,
    },

    /// The player record is incomplete.
    #[error("invalid player: {reason}")]
    InvalidPlayer {
        /// What is wrong with the player.
        reason: String,
    },

    /// A team document is unusable.
    #[error("invalid team: {reason}")]
    InvalidTeam {
        /// What is wrong with the team.
        reason: String,
    },

    /// No player with this jersey number is on the roster.
    #[error("no player wearing #{0} on the roster")]
    PlayerNotFound(u16),

    // === Schedule Errors ===
    /// The match record is incomplete.
    #[error("invalid match: {reason}")]
    InvalidMatch {
        /// What is wrong with the match.
        reason: String,
    },

    /// No match matched the given id or id prefix.
    #[error("no match found for '{0}'")]
    MatchNotFound(String),

    /// An id prefix matched more than one match.
    #[error("'{prefix}' matches {count} matches; use a longer id")]
    AmbiguousMatch {
        /// The prefix that was looked up.
        prefix: String,
        /// Number of matches sharing the prefix.
        count: usize,
    },

    // === Game Errors ===
    /// The requested action does not fit the current rally phase.
    #[error("cannot {action} during the {phase} phase")]
    WrongPhase {
        /// The attempted action.
        action: &'static str,
        /// The phase the game is in.
        phase: &'static str,
    },

    /// The current set is over; start the next set first.
    #[error("set {0} is over")]
    SetOver(u8),

    /// The current set has not been decided yet.
    #[error("set {0} is still in progress")]
    SetInProgress(u8),

    /// The match has been decided.
    #[error("the match is over")]
    MatchOver,

    /// A lineup or substitution request was rejected.
    #[error("lineup error: {0}")]
    Lineup(String),

    /// An unparseable outcome label.
    #[error("unknown {kind} '{value}'")]
    UnknownOutcome {
        /// The outcome family (serve, return, block).
        kind: &'static str,
        /// The label that failed to parse.
        value: String,
    },

    /// A tracking session line is missing arguments.
    #[error("usage: {0}")]
    Usage(&'static str),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read or write a specific document.
    #[error("failed to access {path}: {source}")]
    FileAccess {
        /// The document path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for volleystat operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new invalid player error.
    #[must_use]
    pub fn invalid_player(reason: impl Into<String>) -> Self {
        Self::InvalidPlayer {
            reason: reason.into(),
        }
    }

    /// Create a new invalid match error.
    #[must_use]
    pub fn invalid_match(reason: impl Into<String>) -> Self {
        Self::InvalidMatch {
            reason: reason.into(),
        }
    }

    /// Create a new lineup error.
    #[must_use]
    pub fn lineup(message: impl Into<String>) -> Self {
        Self::Lineup(message.into())
    }

    /// Create an unknown outcome error.
    #[must_use]
    pub fn unknown_outcome(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownOutcome {
            kind,
            value: value.into(),
        }
    }

    /// Check if this error is a roster rule violation.
    #[must_use]
    pub fn is_roster_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateJersey { .. }
                | Self::InvalidPlayer { .. }
                | Self::InvalidTeam { .. }
                | Self::PlayerNotFound(_)
        )
    }

    /// Check if this error came from a rejected game action.
    #[must_use]
    pub fn is_game_error(&self) -> bool {
        matches!(
            self,
            Self::WrongPhase { .. }
                | Self::SetOver(_)
                | Self::SetInProgress(_)
                | Self::MatchOver
                | Self::Lineup(_)
                | Self::UnknownOutcome { .. }
                | Self::Usage(_)
        )
    }
}
