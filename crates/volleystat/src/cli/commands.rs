//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::rally::Side;
use crate::schedule::{PointsToWin, SetFormat};

/// Team roster commands.
#[derive(Debug, Subcommand)]
pub enum TeamCommand {
    /// Show the team and its roster
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Update the team header
    Set {
        /// Team name
        #[arg(long)]
        name: Option<String>,

        /// Hometown
        #[arg(long)]
        hometown: Option<String>,

        /// League
        #[arg(long)]
        league: Option<String>,

        /// Season, e.g. "2024 Fall"
        #[arg(long)]
        season: Option<String>,
    },

    /// Add a player to the roster
    AddPlayer {
        /// Jersey number
        jersey: u16,

        /// Player name
        name: String,

        /// Court position (Setter, Outside, Middle, ...)
        #[arg(short, long, default_value = "")]
        position: String,
    },

    /// Remove a player by jersey number
    RemovePlayer {
        /// Jersey number
        jersey: u16,
    },

    /// Sort the roster by jersey number
    Sort,

    /// Replace the team with one read from a JSON file
    Import {
        /// Team JSON file
        file: PathBuf,
    },

    /// Write the team to `<team_name>_team.json`
    Export {
        /// Output directory (defaults to the export directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

/// Upcoming match commands.
#[derive(Debug, Subcommand)]
pub enum ScheduleCommand {
    /// Schedule a match
    Add(AddMatchCommand),

    /// List upcoming matches
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Move a match to the archive
    Archive {
        /// Match id or unique id prefix
        id: String,
    },
}

/// Arguments for `schedule add`.
#[derive(Debug, Args)]
pub struct AddMatchCommand {
    /// Opponent team name
    pub opponent: String,

    /// Our team name (defaults to the configured or roster team name)
    #[arg(long)]
    pub our_team: Option<String>,

    /// Match date, YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Set format
    #[arg(short, long, value_enum)]
    pub format: Option<SetFormatArg>,

    /// Points rule
    #[arg(short, long, value_enum)]
    pub points: Option<PointsArg>,
}

/// Archived match commands.
#[derive(Debug, Subcommand)]
pub enum ArchiveCommand {
    /// List archived matches
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete an archived match
    Delete {
        /// Match id or unique id prefix
        id: String,
    },

    /// List exported rally logs for an archived match
    Logs {
        /// Match id or unique id prefix
        id: String,
    },
}

/// Live tracking command arguments.
#[derive(Debug, Args)]
pub struct TrackCommand {
    /// Match id or unique id prefix
    pub id: String,

    /// We serve first (the default)
    #[arg(long, conflicts_with = "they_serve")]
    pub we_serve: bool,

    /// The opponent serves first
    #[arg(long)]
    pub they_serve: bool,
}

impl TrackCommand {
    /// Side serving the first rally.
    #[must_use]
    pub fn first_serve(&self) -> Side {
        if self.they_serve {
            Side::Them
        } else {
            Side::Us
        }
    }
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Set format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SetFormatArg {
    /// First to three sets
    #[value(name = "best-of-5", alias = "bo5")]
    BestOf5,
    /// First to two sets
    #[value(name = "best-of-3", alias = "bo3")]
    BestOf3,
    /// Three sets regardless of score
    #[value(name = "always-3")]
    AlwaysPlay3,
}

impl From<SetFormatArg> for SetFormat {
    fn from(arg: SetFormatArg) -> Self {
        match arg {
            SetFormatArg::BestOf5 => Self::BestOf5,
            SetFormatArg::BestOf3 => Self::BestOf3,
            SetFormatArg::AlwaysPlay3 => Self::AlwaysPlay3,
        }
    }
}

/// Points rule argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PointsArg {
    /// Every set to 25
    #[value(name = "25")]
    TwentyFive,
    /// Deciding set to 15
    #[value(name = "25-15", alias = "25/15")]
    TwentyFiveFifteen,
}

impl From<PointsArg> for PointsToWin {
    fn from(arg: PointsArg) -> Self {
        match arg {
            PointsArg::TwentyFive => Self::TwentyFive,
            PointsArg::TwentyFiveFifteen => Self::TwentyFiveFifteen,
        }
    }
}
