//! Line-oriented live tracking session.
//!
//! `vstat track` reads one command per line from stdin, parses it into a
//! [`SessionCommand`] and applies it to a [`Session`].

use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use crate::error::{Error, Result};
use crate::export::{match_filename, save_rally_log};
use crate::game::{GameRules, GameState};
use crate::lineup::{Lineup, COURT_SIZE};
use crate::rally::{BlockOutcome, RallyEvent, ReturnOutcome, ServeOutcome, Side};
use crate::schedule::Match;
use crate::team::Player;

/// Help text for the tracking session.
pub const SESSION_HELP: &str = "\
Commands:
  serve <ace|error|return>           serve result
  rally <touch> [touch] [touch]      touches on our side, e.g. 10:Pass:OK
  return <error|return>              what they did with our ball
  block <jersey> <kind> [assist]     kind: block, kill, tip, assist, error
  point <us|them>                    award a point directly
  sub <out> <in>                     substitution during a dead ball
  rotation <1-6>                     set the rotation
  lineup <j1> .. <j6>                set the court lineup ('-' for empty)
  undo                               revert the last action
  next-set [us|them]                 start the next set, naming the server
  status                             show score and phase
  save                               export the rally log
  archive                            save, archive the match and quit
  quit                               leave the session";

/// One parsed session line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Record a serve result.
    Serve(ServeOutcome),
    /// Record up to three touches.
    Rally([Option<String>; 3]),
    /// Record what they did with our ball.
    Return(ReturnOutcome),
    /// Record a block.
    Block {
        /// Blocking jersey.
        blocker: u16,
        /// Block result.
        outcome: BlockOutcome,
        /// Second blocker for an assist.
        assist: Option<u16>,
    },
    /// Award a point directly.
    Point(Side),
    /// Substitute `incoming` for `out`.
    Sub {
        /// Jersey leaving the court.
        out: u16,
        /// Jersey entering.
        incoming: u16,
    },
    /// Set the rotation.
    Rotation(u8),
    /// Replace the court lineup.
    Lineup(Lineup),
    /// Revert the last action.
    Undo,
    /// Start the next set with the given server.
    NextSet(Side),
    /// Print the status line.
    Status,
    /// Export the rally log.
    Save,
    /// Save, archive the match and leave.
    Archive,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

fn number<T: FromStr>(kind: &'static str, s: &str) -> Result<T> {
    s.trim_start_matches('#')
        .parse()
        .map_err(|_| Error::unknown_outcome(kind, s))
}

fn arg<'a>(args: &[&'a str], i: usize, usage: &'static str) -> Result<&'a str> {
    args.get(i).copied().ok_or(Error::Usage(usage))
}

impl FromStr for SessionCommand {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Err(Error::Usage("help"));
        };
        let args: Vec<&str> = words.collect();

        let parsed = match command.to_ascii_lowercase().as_str() {
            "serve" => Self::Serve(arg(&args, 0, "serve <ace|error|return>")?.parse()?),
            "rally" => {
                if args.is_empty() || args.len() > 3 {
                    return Err(Error::Usage("rally <touch> [touch] [touch]"));
                }
                let mut touches: [Option<String>; 3] = Default::default();
                for (slot, touch) in touches.iter_mut().zip(&args) {
                    *slot = Some((*touch).to_string());
                }
                Self::Rally(touches)
            }
            "return" => Self::Return(arg(&args, 0, "return <error|return>")?.parse()?),
            "block" => {
                let usage = "block <jersey> <kind> [assist]";
                Self::Block {
                    blocker: number("jersey", arg(&args, 0, usage)?)?,
                    outcome: arg(&args, 1, usage)?.parse()?,
                    assist: args.get(2).map(|a| number("jersey", a)).transpose()?,
                }
            }
            "point" => Self::Point(arg(&args, 0, "point <us|them>")?.parse()?),
            "sub" => {
                let usage = "sub <out> <in>";
                Self::Sub {
                    out: number("jersey", arg(&args, 0, usage)?)?,
                    incoming: number("jersey", arg(&args, 1, usage)?)?,
                }
            }
            "rotation" => Self::Rotation(number("rotation", arg(&args, 0, "rotation <1-6>")?)?),
            "lineup" => {
                if args.len() != COURT_SIZE {
                    return Err(Error::Usage("lineup <j1> .. <j6>"));
                }
                let mut lineup = Lineup::new();
                for (slot, value) in (1u8..).zip(&args) {
                    let jersey = if *value == "-" {
                        None
                    } else {
                        Some(number("jersey", value)?)
                    };
                    lineup.set(slot, jersey)?;
                }
                Self::Lineup(lineup)
            }
            "undo" => Self::Undo,
            "next-set" | "next" => {
                Self::NextSet(args.first().map_or(Ok(Side::Us), |s| s.parse())?)
            }
            "status" => Self::Status,
            "save" => Self::Save,
            "archive" => Self::Archive,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(Error::unknown_outcome("command", other)),
        };
        Ok(parsed)
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print the message and read the next line.
    Continue(String),
    /// The log is saved; archive the match and leave.
    Archive(PathBuf),
    /// Leave the session.
    Quit,
}

/// A tracking session for one scheduled match.
#[derive(Debug)]
pub struct Session {
    scheduled: Match,
    game: GameState,
    roster: Vec<Player>,
    export_dir: PathBuf,
    /// Events as last written to the rally log.
    saved_log: Option<Vec<RallyEvent>>,
}

impl Session {
    /// Start tracking `scheduled`, with the lowest six jerseys on court.
    #[must_use]
    pub fn new(
        scheduled: Match,
        rules: GameRules,
        roster: Vec<Player>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        let game = GameState::new(rules).with_lineup(Lineup::from_roster(&roster));
        Self {
            scheduled,
            game,
            roster,
            export_dir: export_dir.into(),
            saved_log: None,
        }
    }

    /// The match being tracked.
    #[must_use]
    pub fn scheduled(&self) -> &Match {
        &self.scheduled
    }

    /// Live game state.
    #[must_use]
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Check whether the event log differs from the last save.
    #[must_use]
    pub fn has_unsaved_events(&self) -> bool {
        match &self.saved_log {
            Some(saved) => saved.as_slice() != self.game.events(),
            None => !self.game.events().is_empty(),
        }
    }

    /// Rally log path for this match.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.export_dir.join(match_filename(
            &self.scheduled.our_team,
            &self.scheduled.opponent,
            self.scheduled.date,
        ))
    }

    /// Choose who serves the first rally.
    ///
    /// # Errors
    ///
    /// Fails once play has moved past the first serve.
    pub fn start(&mut self, first_serve: Side) -> Result<()> {
        self.game.start(first_serve)
    }

    /// Export the rally log, returning its path.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written.
    pub fn save(&mut self) -> Result<PathBuf> {
        let filename = match_filename(
            &self.scheduled.our_team,
            &self.scheduled.opponent,
            self.scheduled.date,
        );
        let path = save_rally_log(self.game.events(), &self.export_dir, &filename)?;
        self.saved_log = Some(self.game.events().to_vec());
        Ok(path)
    }

    /// One-line summary of the game.
    #[must_use]
    pub fn status(&self) -> String {
        let game = &self.game;
        let mut line = format!(
            "Set {} ({}-{}) | {} {} - {} {} | rotation {} | {} serving | {}",
            game.set_number(),
            game.sets_us(),
            game.sets_them(),
            self.scheduled.our_team,
            game.score_us(),
            game.score_them(),
            self.scheduled.opponent,
            game.rotation(),
            game.serving(),
            game.phase(),
        );
        if game.is_match_over() {
            line.push_str(" | match over");
        } else if let Some(winner) = game.set_winner() {
            let _ = write!(line, " | set to {winner}, use next-set");
        }
        line
    }

    /// Apply one command.
    ///
    /// # Errors
    ///
    /// Returns the game error for a rejected action, or an I/O error when
    /// saving fails.
    pub fn execute(&mut self, command: SessionCommand) -> Result<Step> {
        match command {
            SessionCommand::Serve(outcome) => self.game.handle_serve(outcome)?,
            SessionCommand::Rally([t1, t2, t3]) => {
                self.game.handle_rally(t1, t2, t3)?;
            }
            SessionCommand::Return(outcome) => self.game.handle_return(outcome)?,
            SessionCommand::Block {
                blocker,
                outcome,
                assist,
            } => self.game.handle_block(blocker, outcome, assist)?,
            SessionCommand::Point(Side::Us) => self.game.point_us()?,
            SessionCommand::Point(Side::Them) => self.game.point_them()?,
            SessionCommand::Sub { out, incoming } => {
                self.game.substitute(out, incoming, &self.roster)?;
            }
            SessionCommand::Rotation(rotation) => self.game.set_rotation(rotation)?,
            SessionCommand::Lineup(lineup) => {
                if let Some(jersey) = lineup
                    .slots()
                    .iter()
                    .flatten()
                    .find(|j| !self.roster.iter().any(|p| p.jersey == **j))
                {
                    return Err(Error::lineup(format!("#{jersey} is not on the roster")));
                }
                self.game.set_lineup(lineup)?;
            }
            SessionCommand::Undo => {
                if !self.game.undo() {
                    return Ok(Step::Continue("Nothing to undo".to_string()));
                }
            }
            SessionCommand::NextSet(first_serve) => self.game.start_next_set(first_serve)?,
            SessionCommand::Status => {
                return Ok(Step::Continue(format!(
                    "{}\n{}",
                    self.status(),
                    self.game.lineup()
                )));
            }
            SessionCommand::Save => {
                let path = self.save()?;
                return Ok(Step::Continue(format!(
                    "Saved {} events to {}",
                    self.game.events().len(),
                    path.display()
                )));
            }
            SessionCommand::Archive => {
                let path = self.save()?;
                info!("Archiving {}", self.scheduled.title());
                return Ok(Step::Archive(path));
            }
            SessionCommand::Help => return Ok(Step::Continue(SESSION_HELP.to_string())),
            SessionCommand::Quit => return Ok(Step::Quit),
        }
        Ok(Step::Continue(self.status()))
    }
}
