//! Rally log export.
//!
//! A rally log is the event list of one tracked match, written as a pretty
//! JSON array to `<YYMMDD>_<our team>_<their team>.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::rally::RallyEvent;
use crate::storage;

/// Anything outside this set becomes `_` in a file name.
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("Invalid regex pattern"));

/// Make `name` safe to embed in a file name.
///
/// Spaces and every character other than ASCII letters, digits, `.`, `_`
/// and `-` are replaced with `_`. An empty name becomes `unnamed`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "unnamed".to_string();
    }
    UNSAFE_CHARS.replace_all(trimmed, "_").into_owned()
}

/// File name of the rally log for a match.
#[must_use]
pub fn match_filename(our_team: &str, their_team: &str, date: NaiveDate) -> String {
    format!(
        "{}_{}_{}.json",
        date.format("%y%m%d"),
        sanitize_name(our_team),
        sanitize_name(their_team)
    )
}

/// Write `events` to `dir/filename`, returning the full path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn save_rally_log(events: &[RallyEvent], dir: &Path, filename: &str) -> Result<PathBuf> {
    let path = dir.join(filename);
    storage::write_json(&path, events)?;
    info!("Exported {} events to {}", events.len(), path.display());
    Ok(path)
}

/// Read a rally log written by [`save_rally_log`].
///
/// # Errors
///
/// Returns an error if the file is missing or is not a list of events.
pub fn load_rally_log(path: &Path) -> Result<Vec<RallyEvent>> {
    storage::read_json(path)
}

/// Rally logs in `dir` for the given pairing, newest first.
///
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be listed.
pub fn find_rally_logs(dir: &Path, our_team: &str, their_team: &str) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        r"^(\d{{6}})_{}_{}\.json$",
        regex::escape(&sanitize_name(our_team)),
        regex::escape(&sanitize_name(their_team))
    );
    let re = Regex::new(&pattern).map_err(|e| Error::invalid_match(e.to_string()))?;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Export directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(Error::FileAccess {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut logs: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(caps) = re.captures(name) {
            logs.push((caps[1].to_string(), path.clone()));
        }
    }

    logs.sort_by(|a, b| b.cmp(a));
    Ok(logs.into_iter().map(|(_, path)| path).collect())
}
