//! `volleystat` - Volleyball match stat recorder
//!
//! This library keeps a team roster, a match schedule and an archive as
//! local JSON documents, and tracks a live match rally by rally, exporting
//! the rally log per match.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod game;
pub mod lineup;
pub mod logging;
pub mod rally;
pub mod schedule;
pub mod storage;
pub mod team;

pub use config::Config;
pub use error::{Error, Result};
pub use game::{GameRules, GameState};
pub use lineup::Lineup;
pub use logging::init_logging;
pub use rally::{BlockOutcome, RallyEvent, RallyPhase, ReturnOutcome, ServeOutcome, Side};
pub use schedule::{Match, PointsToWin, Schedule, SetFormat};
pub use storage::DataLayout;
pub use team::{Player, Team, TeamBook};
