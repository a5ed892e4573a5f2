//! File layout of the data directory.

use std::path::{Path, PathBuf};

/// Roster document.
pub const TEAM_FILE: &str = "team.json";

/// Upcoming matches document.
pub const SCHEDULE_FILE: &str = "schedule.json";

/// Archived matches document.
pub const ARCHIVE_FILE: &str = "archived_matches.json";

/// Resolved locations of every document volleystat reads or writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
    export_dir: PathBuf,
}

impl DataLayout {
    /// Lay out documents under `root`, with rally logs in `export_dir`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            export_dir: export_dir.into(),
        }
    }

    /// Lay out everything, rally logs included, under one directory.
    #[must_use]
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            export_dir: root.clone(),
            root,
        }
    }

    /// The data directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory rally logs and team exports are written to.
    #[must_use]
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Path of `team.json`.
    #[must_use]
    pub fn team_path(&self) -> PathBuf {
        self.root.join(TEAM_FILE)
    }

    /// Path of `schedule.json`.
    #[must_use]
    pub fn schedule_path(&self) -> PathBuf {
        self.root.join(SCHEDULE_FILE)
    }

    /// Path of `archived_matches.json`.
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.root.join(ARCHIVE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_shares_export_dir() {
        let layout = DataLayout::in_dir("/data");
        assert_eq!(layout.root(), Path::new("/data"));
        assert_eq!(layout.export_dir(), Path::new("/data"));
    }

    #[test]
    fn test_document_paths() {
        let layout = DataLayout::new("/data", "/exports");
        assert_eq!(layout.team_path(), PathBuf::from("/data/team.json"));
        assert_eq!(layout.schedule_path(), PathBuf::from("/data/schedule.json"));
        assert_eq!(
            layout.archive_path(),
            PathBuf::from("/data/archived_matches.json")
        );
        assert_eq!(layout.export_dir(), Path::new("/exports"));
    }
}
