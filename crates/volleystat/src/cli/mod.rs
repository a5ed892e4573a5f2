//! Command-line interface for volleystat.
//!
//! This module provides the CLI structure and the live tracking session
//! for the `vstat` binary.

mod commands;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddMatchCommand, ArchiveCommand, ConfigCommand, PointsArg, ScheduleCommand, SetFormatArg,
    TeamCommand, TrackCommand,
};
pub use session::{Session, SessionCommand, Step};

/// vstat - Volleyball match stat recorder
///
/// Keeps the team roster and match schedule, and records serves, rallies
/// and blocks point by point during a match.
#[derive(Debug, Parser)]
#[command(name = "vstat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the team roster
    #[command(subcommand)]
    Team(TeamCommand),

    /// Manage upcoming matches
    #[command(subcommand)]
    Schedule(ScheduleCommand),

    /// Browse archived matches
    #[command(subcommand)]
    Archive(ArchiveCommand),

    /// Track a match live from stdin
    Track(TrackCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
