//! Match schedule and archive.
//!
//! Upcoming matches live in `schedule.json`, finished ones in
//! `archived_matches.json`. Both files are rewritten on every change.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage;

/// How many sets a match is played over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SetFormat {
    /// First to three sets.
    #[default]
    #[serde(rename = "Best of 5")]
    BestOf5,
    /// First to two sets.
    #[serde(rename = "Best of 3")]
    BestOf3,
    /// Exactly three sets regardless of score.
    #[serde(rename = "Always Play 3")]
    AlwaysPlay3,
}

impl SetFormat {
    /// All formats in display order.
    pub const ALL: [Self; 3] = [Self::BestOf5, Self::BestOf3, Self::AlwaysPlay3];

    /// Maximum number of sets that can be played.
    #[must_use]
    pub fn max_sets(self) -> u8 {
        match self {
            Self::BestOf5 => 5,
            Self::BestOf3 | Self::AlwaysPlay3 => 3,
        }
    }

    /// Set wins that decide the match, if winning early ends it.
    #[must_use]
    pub fn sets_to_win(self) -> Option<u8> {
        match self {
            Self::BestOf5 => Some(3),
            Self::BestOf3 => Some(2),
            Self::AlwaysPlay3 => None,
        }
    }

    /// Check whether the match is decided after these set counts.
    #[must_use]
    pub fn is_decided(self, sets_us: u8, sets_them: u8) -> bool {
        match self.sets_to_win() {
            Some(needed) => sets_us >= needed || sets_them >= needed,
            None => sets_us + sets_them >= self.max_sets(),
        }
    }

    /// The wire label, e.g. `"Best of 5"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::BestOf5 => "Best of 5",
            Self::BestOf3 => "Best of 3",
            Self::AlwaysPlay3 => "Always Play 3",
        }
    }
}

impl fmt::Display for SetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "bestof5" | "bo5" | "5" => Ok(Self::BestOf5),
            "bestof3" | "bo3" | "3" => Ok(Self::BestOf3),
            "alwaysplay3" | "always3" => Ok(Self::AlwaysPlay3),
            _ => Err(Error::invalid_match(format!("unknown set format '{s}'"))),
        }
    }
}

/// Points needed to win a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PointsToWin {
    /// Every set to 25.
    #[serde(rename = "25")]
    TwentyFive,
    /// Every set to 25 except a deciding set to 15.
    #[default]
    #[serde(rename = "25/15")]
    TwentyFiveFifteen,
}

impl PointsToWin {
    /// Both variants in display order.
    pub const ALL: [Self; 2] = [Self::TwentyFive, Self::TwentyFiveFifteen];

    /// Check whether the deciding set uses the short target.
    #[must_use]
    pub fn has_short_deciding_set(self) -> bool {
        matches!(self, Self::TwentyFiveFifteen)
    }

    /// The wire label, e.g. `"25/15"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::TwentyFive => "25",
            Self::TwentyFiveFifteen => "25/15",
        }
    }
}

impl fmt::Display for PointsToWin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PointsToWin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "25" => Ok(Self::TwentyFive),
            "25/15" | "25-15" => Ok(Self::TwentyFiveFifteen),
            other => Err(Error::invalid_match(format!(
                "unknown points to win '{other}'"
            ))),
        }
    }
}

/// A scheduled match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Stable identifier.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Our team's name.
    pub our_team: String,
    /// Opponent's name.
    pub opponent: String,
    /// Match day.
    pub date: NaiveDate,
    /// Number of sets played.
    #[serde(default)]
    pub set_format: SetFormat,
    /// Set targets.
    #[serde(default)]
    pub points_to_win: PointsToWin,
}

impl Match {
    /// Create a match for today using the default rules.
    #[must_use]
    pub fn new(our_team: impl Into<String>, opponent: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            our_team: our_team.into(),
            opponent: opponent.into(),
            date: Local::now().date_naive(),
            set_format: SetFormat::default(),
            points_to_win: PointsToWin::default(),
        }
    }

    /// Set the match day.
    #[must_use]
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Set the match rules.
    #[must_use]
    pub fn with_rules(mut self, set_format: SetFormat, points_to_win: PointsToWin) -> Self {
        self.set_format = set_format;
        self.points_to_win = points_to_win;
        self
    }

    /// Short form of the id used for display and lookup.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    /// One-line description, e.g. `"Falcons vs Hawks (2025-10-04)"`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("{} vs {} ({})", self.our_team, self.opponent, self.date)
    }

    fn validate(&self) -> Result<()> {
        if self.our_team.trim().is_empty() {
            return Err(Error::invalid_match("our team is empty"));
        }
        if self.opponent.trim().is_empty() {
            return Err(Error::invalid_match("opponent is empty"));
        }
        Ok(())
    }
}

/// Find a match by full id or unique id prefix.
fn lookup<'a>(matches: &'a [Match], key: &str) -> Result<&'a Match> {
    let key = key.trim().to_ascii_lowercase().replace('-', "");
    if key.is_empty() {
        return Err(Error::MatchNotFound(key));
    }
    let found: Vec<&Match> = matches
        .iter()
        .filter(|m| m.id.simple().to_string().starts_with(&key))
        .collect();
    match found.as_slice() {
        [single] => Ok(*single),
        [] => Err(Error::MatchNotFound(key)),
        many => Err(Error::AmbiguousMatch {
            prefix: key,
            count: many.len(),
        }),
    }
}

/// The schedule book: upcoming and archived matches.
#[derive(Debug)]
pub struct Schedule {
    schedule_path: PathBuf,
    archive_path: PathBuf,
    matches: Vec<Match>,
    archived: Vec<Match>,
}

impl Schedule {
    /// Open both documents, starting empty where a file is missing or unreadable.
    #[must_use]
    pub fn open(schedule_path: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        let schedule_path = schedule_path.into();
        let archive_path = archive_path.into();
        let matches = storage::read_json_or_default(&schedule_path, "schedule");
        let archived = storage::read_json_or_default(&archive_path, "archived matches");
        Self {
            schedule_path,
            archive_path,
            matches,
            archived,
        }
    }

    /// Upcoming matches.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Archived matches.
    #[must_use]
    pub fn archived(&self) -> &[Match] {
        &self.archived
    }

    /// Look up an upcoming match.
    ///
    /// # Errors
    ///
    /// Returns an error if no match or more than one match fits `key`.
    pub fn find(&self, key: &str) -> Result<&Match> {
        lookup(&self.matches, key)
    }

    /// Look up an archived match.
    ///
    /// # Errors
    ///
    /// Returns an error if no match or more than one match fits `key`.
    pub fn find_archived(&self, key: &str) -> Result<&Match> {
        lookup(&self.archived, key)
    }

    /// Schedule a match and save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMatch`] if either team name is empty.
    pub fn add_match(&mut self, new_match: Match) -> Result<()> {
        new_match.validate()?;
        info!("Scheduled {}", new_match.title());
        self.matches.push(new_match);
        self.save_matches()
    }

    /// Move a match from the schedule to the archive and save both files.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is not scheduled or a save fails.
    pub fn archive_match(&mut self, key: &str) -> Result<Match> {
        let id = self.find(key)?.id;
        let index = self
            .matches
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MatchNotFound(key.to_string()))?;
        let archived = self.matches.remove(index);
        info!("Archived {}", archived.title());
        self.archived.push(archived.clone());
        self.save_matches()?;
        self.save_archived()?;
        Ok(archived)
    }

    /// Delete a match from the archive and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is not archived or the save fails.
    pub fn delete_archived(&mut self, key: &str) -> Result<Match> {
        let id = self.find_archived(key)?.id;
        let index = self
            .archived
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| Error::MatchNotFound(key.to_string()))?;
        let removed = self.archived.remove(index);
        info!("Deleted archived {}", removed.title());
        self.save_archived()?;
        Ok(removed)
    }

    /// Write `schedule.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_matches(&self) -> Result<()> {
        storage::write_json(&self.schedule_path, &self.matches)
    }

    /// Write `archived_matches.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_archived(&self) -> Result<()> {
        storage::write_json(&self.archive_path, &self.archived)
    }
}
