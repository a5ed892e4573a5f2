//! Team roster and its book.
//!
//! The roster holds one team ("our team") and is persisted to `team.json`
//! on every mutation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::export::sanitize_name;
use crate::storage;

/// Positions offered when adding a player. Any other label is accepted.
pub const POSITIONS: [&str; 7] = [
    "Setter",
    "Outside",
    "Middle",
    "Right-Side",
    "Libero",
    "Defensive",
    "Utility",
];

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Player name.
    pub name: String,
    /// Jersey number, unique within a team.
    pub jersey: u16,
    /// Playing position (free text).
    #[serde(default)]
    pub position: String,
}

impl Player {
    /// Create a player with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, jersey: u16, position: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            jersey,
            position: position.into(),
        }
    }

    /// True when the position is blank or one of [`POSITIONS`], ignoring case.
    #[must_use]
    pub fn has_standard_position(&self) -> bool {
        let position = self.position.trim();
        position.is_empty() || POSITIONS.iter().any(|p| p.eq_ignore_ascii_case(position))
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_player("name is empty"));
        }
        if self.jersey == 0 {
            return Err(Error::invalid_player("jersey number must be greater than 0"));
        }
        Ok(())
    }
}

/// A team and its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Stable identifier.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Team name.
    #[serde(default)]
    pub name: String,
    /// Home town.
    #[serde(default)]
    pub hometown: String,
    /// League the team plays in.
    #[serde(default)]
    pub league: String,
    /// Season label, e.g. "Fall 2025".
    #[serde(default)]
    pub season: String,
    /// Roster.
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Default for Team {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            hometown: String::new(),
            league: String::new(),
            season: String::new(),
            players: Vec::new(),
        }
    }
}

impl Team {
    /// Create an empty team with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Find a player by jersey number.
    #[must_use]
    pub fn find_player(&self, jersey: u16) -> Option<&Player> {
        self.players.iter().find(|p| p.jersey == jersey)
    }

    /// Check whether a jersey number is already on the roster.
    #[must_use]
    pub fn has_jersey(&self, jersey: u16) -> bool {
        self.find_player(jersey).is_some()
    }

    /// Add a player, enforcing the roster rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlayer`] for an empty name or jersey 0, and
    /// [`Error::DuplicateJersey`] if the number is taken.
    pub fn add_player(&mut self, player: Player) -> Result<()> {
        player.validate()?;
        if let Some(existing) = self.find_player(player.jersey) {
            return Err(Error::DuplicateJersey {
                jersey: player.jersey,
                name: existing.name.clone(),
            });
        }
        self.players.push(player);
        Ok(())
    }

    /// Remove the player wearing `jersey`, returning them if present.
    pub fn remove_player(&mut self, jersey: u16) -> Option<Player> {
        let index = self.players.iter().position(|p| p.jersey == jersey)?;
        Some(self.players.remove(index))
    }

    /// Sort the roster by jersey number.
    pub fn sort_roster(&mut self) {
        self.players.sort_by_key(|p| p.jersey);
    }
}

/// Fields of the team header to update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamInfo {
    /// New team name.
    pub name: Option<String>,
    /// New home town.
    pub hometown: Option<String>,
    /// New league.
    pub league: Option<String>,
    /// New season.
    pub season: Option<String>,
}

/// The roster book: one team persisted to `team.json`.
#[derive(Debug)]
pub struct TeamBook {
    path: PathBuf,
    team: Team,
}

impl TeamBook {
    /// Open the book at `path`.
    ///
    /// A missing or unreadable file is logged and yields an empty team.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let team = storage::read_json_or_default(&path, "team");
        Self { path, team }
    }

    /// The team.
    #[must_use]
    pub fn team(&self) -> &Team {
        &self.team
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the team to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        storage::write_json(&self.path, &self.team)
    }

    /// Update header fields and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn update_info(&mut self, info: TeamInfo) -> Result<()> {
        let TeamInfo {
            name,
            hometown,
            league,
            season,
        } = info;
        if let Some(name) = name {
            self.team.name = name;
        }
        if let Some(hometown) = hometown {
            self.team.hometown = hometown;
        }
        if let Some(league) = league {
            self.team.league = league;
        }
        if let Some(season) = season {
            self.team.season = season;
        }
        self.save()
    }

    /// Add a player and save.
    ///
    /// # Errors
    ///
    /// Returns a roster error if the player is rejected, or an I/O error if
    /// the save fails.
    pub fn add_player(&mut self, player: Player) -> Result<()> {
        let jersey = player.jersey;
        if !player.has_standard_position() {
            warn!(
                "Position '{}' for #{} is not one of: {}",
                player.position,
                jersey,
                POSITIONS.join(", ")
            );
        }
        self.team.add_player(player)?;
        info!("Added #{} to {}", jersey, self.team.name);
        self.save()
    }

    /// Remove the player wearing `jersey` and save.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerNotFound`] if nobody wears that number.
    pub fn remove_player(&mut self, jersey: u16) -> Result<Player> {
        let player = self
            .team
            .remove_player(jersey)
            .ok_or(Error::PlayerNotFound(jersey))?;
        self.save()?;
        Ok(player)
    }

    /// Sort the roster by jersey number and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn sort_roster(&mut self) -> Result<()> {
        self.team.sort_roster();
        self.save()
    }

    /// Replace the team with one read from `source` and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be decoded, the team has no name,
    /// or its roster repeats a jersey number.
    pub fn import(&mut self, source: &Path) -> Result<()> {
        let incoming: Team = storage::read_json(source)?;
        if incoming.name.trim().is_empty() {
            return Err(Error::InvalidTeam {
                reason: "imported team has no name".to_string(),
            });
        }

        // Re-add through the roster rules
        let mut team = Team {
            players: Vec::with_capacity(incoming.players.len()),
            ..incoming.clone()
        };
        for player in incoming.players {
            team.add_player(player)?;
        }

        if !self.team.name.is_empty() && self.team.name != team.name {
            warn!("Replacing team {} with {}", self.team.name, team.name);
        }
        self.team = team;
        self.save()
    }

    /// Export the team to `<dir>/<team_name>_team.json`, returning the path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn export(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}_team.json", sanitize_name(&self.team.name)));
        storage::write_json(&path, &self.team)?;
        info!("Exported team to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_book(dir: &Path) -> TeamBook {
        TeamBook::open(dir.join("team.json"))
    }

    #[test]
    fn test_add_player_rejects_duplicate_jersey() {
        let mut team = Team::named("Falcons");
        team.add_player(Player::new("Ana", 7, "Setter")).unwrap();

        let err = team.add_player(Player::new("Bea", 7, "Libero")).unwrap_err();
        assert!(matches!(err, Error::DuplicateJersey { jersey: 7, .. }));
        assert_eq!(team.players.len(), 1);
    }

    #[test]
    fn test_add_player_rejects_empty_name() {
        let mut team = Team::named("Falcons");
        let err = team.add_player(Player::new("  ", 3, "Middle")).unwrap_err();
        assert!(matches!(err, Error::InvalidPlayer { .. }));
    }

    #[test]
    fn test_standard_positions() {
        assert!(Player::new("Ana", 7, "Setter").has_standard_position());
        assert!(Player::new("Ana", 7, "right-side").has_standard_position());
        assert!(Player::new("Ana", 7, "").has_standard_position());
        assert!(!Player::new("Ana", 7, "Goalie").has_standard_position());
    }

    #[test]
    fn test_book_accepts_nonstandard_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = create_test_book(dir.path());
        book.add_player(Player::new("Dee", 9, "Opposite")).unwrap();
        assert_eq!(book.team().find_player(9).unwrap().position, "Opposite");
    }

    #[test]
    fn test_add_player_rejects_jersey_zero() {
        let mut team = Team::named("Falcons");
        let err = team.add_player(Player::new("Cat", 0, "Outside")).unwrap_err();
        assert!(err.to_string().contains("greater than 0"));
    }

    #[test]
    fn test_find_and_remove_player() {
        let mut team = Team::named("Falcons");
        team.add_player(Player::new("Ana", 7, "Setter")).unwrap();
        team.add_player(Player::new("Dee", 12, "Middle")).unwrap();

        assert_eq!(team.find_player(12).map(|p| p.name.as_str()), Some("Dee"));
        assert!(team.has_jersey(7));

        let removed = team.remove_player(7).unwrap();
        assert_eq!(removed.name, "Ana");
        assert!(!team.has_jersey(7));
        assert!(team.remove_player(99).is_none());
    }

    #[test]
    fn test_sort_roster() {
        let mut team = Team::named("Falcons");
        for (name, jersey) in [("C", 15), ("A", 2), ("B", 9)] {
            team.add_player(Player::new(name, jersey, "")).unwrap();
        }
        team.sort_roster();
        let jerseys: Vec<u16> = team.players.iter().map(|p| p.jersey).collect();
        assert_eq!(jerseys, vec![2, 9, 15]);
    }

    #[test]
    fn test_book_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let book = create_test_book(dir.path());
        assert!(book.team().name.is_empty());
        assert!(book.team().players.is_empty());
    }

    #[test]
    fn test_book_persists_every_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = create_test_book(dir.path());
        book.update_info(TeamInfo {
            name: Some("Falcons".to_string()),
            season: Some("Fall 2025".to_string()),
            ..TeamInfo::default()
        })
        .unwrap();
        book.add_player(Player::new("Ana", 7, "Setter")).unwrap();

        let reopened = create_test_book(dir.path());
        assert_eq!(reopened.team(), book.team());
        assert_eq!(reopened.team().season, "Fall 2025");
        assert_eq!(reopened.team().players[0].jersey, 7);
    }

    #[test]
    fn test_book_rejected_player_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = create_test_book(dir.path());
        book.add_player(Player::new("Ana", 7, "Setter")).unwrap();
        assert!(book.add_player(Player::new("Bea", 7, "")).is_err());

        let reopened = create_test_book(dir.path());
        assert_eq!(reopened.team().players.len(), 1);
    }

    #[test]
    fn test_book_remove_unknown_player() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = create_test_book(dir.path());
        let err = book.remove_player(4).unwrap_err();
        assert!(matches!(err, Error::PlayerNotFound(4)));
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = create_test_book(dir.path());
        book.update_info(TeamInfo {
            name: Some("River City".to_string()),
            ..TeamInfo::default()
        })
        .unwrap();
        book.add_player(Player::new("Ana", 7, "Setter")).unwrap();

        let exported = book.export(dir.path()).unwrap();
        assert!(exported.ends_with("River_City_team.json"));

        let other_dir = tempfile::tempdir().unwrap();
        let mut other = create_test_book(other_dir.path());
        other.import(&exported).unwrap();
        assert_eq!(other.team().name, "River City");
        assert_eq!(other.team().players.len(), 1);
    }

    #[test]
    fn test_import_rejects_duplicate_jerseys() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("bad_team.json");
        std::fs::write(
            &source,
            r#"{"name": "Dupes", "players": [
                {"name": "A", "jersey": 4, "position": ""},
                {"name": "B", "jersey": 4, "position": ""}
            ]}"#,
        )
        .unwrap();

        let mut book = create_test_book(dir.path());
        assert!(book.import(&source).is_err());
        assert!(book.team().name.is_empty());
    }

    #[test]
    fn test_team_json_field_names() {
        let team = Team::named("Falcons");
        let json = serde_json::to_string(&team).unwrap();
        for field in ["\"name\"", "\"hometown\"", "\"league\"", "\"season\"", "\"players\""] {
            assert!(json.contains(field), "missing {field}");
        }
    }
}
