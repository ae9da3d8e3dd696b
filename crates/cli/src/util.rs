use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Tracker home, created on first use
pub fn tracker_home() -> Result<PathBuf> {
    let dir = common::tracker_home();
    ensure_dir(&dir)?;
    Ok(dir)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}

/// Make sure the directory holding `db_path` exists
pub fn ensure_parent_dir(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    Ok(())
}

pub fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).with_context(|| format!("'{raw}' is not a valid {what} id"))
}

pub fn format_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Five-star strip, filled up to the viewer's rating
pub fn stars(states: [bool; 5]) -> String {
    states
        .iter()
        .map(|filled| if *filled { '★' } else { '☆' })
        .collect()
}
