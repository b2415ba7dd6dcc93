//! Migration file naming: `{sequence}_{label}_{up|down}.surql`

use crate::module_id::ModuleId;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Extension of migration script files.
pub const SCRIPT_EXTENSION: &str = "surql";

static MIGRATION_FILE_RE: OnceLock<Regex> = OnceLock::new();

fn migration_file_re() -> &'static Regex {
    MIGRATION_FILE_RE.get_or_init(|| {
        Regex::new(r"^(\d{4})_([a-z0-9][a-z0-9_-]*)_(up|down)\.surql$")
            .expect("migration file pattern is valid")
    })
}

/// Which half of a versioned change a file contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// The direction a file must be paired with.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Filename suffix, e.g. `_up.surql`.
    pub fn suffix(self) -> String {
        format!("_{}.{SCRIPT_EXTENSION}", self.as_str())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One direction of a versioned change within a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationFile {
    pub module_id: ModuleId,
    /// Four-digit ordinal as written, e.g. `"0001"`
    pub sequence: String,
    pub label: String,
    pub direction: Direction,
    pub path: PathBuf,
}

impl MigrationFile {
    /// Parse a file name into its parts, returning `None` if it does not
    /// follow the naming convention.
    pub fn parse_name(file_name: &str) -> Option<(String, String, Direction)> {
        let caps = migration_file_re().captures(file_name)?;
        let direction = match &caps[3] {
            "up" => Direction::Up,
            _ => Direction::Down,
        };
        Some((caps[1].to_string(), caps[2].to_string(), direction))
    }

    /// Returns `true` if the name ends in one of the direction suffixes.
    pub fn has_direction_suffix(file_name: &str) -> bool {
        file_name.ends_with(&Direction::Up.suffix()) || file_name.ends_with(&Direction::Down.suffix())
    }

    /// Canonical file name.
    pub fn file_name(&self) -> String {
        file_name_for(&self.sequence, &self.label, self.direction)
    }

    /// File name of the matching file in the opposite direction.
    pub fn counterpart_name(&self) -> String {
        file_name_for(&self.sequence, &self.label, self.direction.opposite())
    }
}

fn file_name_for(sequence: &str, label: &str, direction: Direction) -> String {
    format!("{sequence}_{label}{}", direction.suffix())
}
