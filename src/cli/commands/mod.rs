//! Command implementations.

pub mod backup;
pub mod profile;
pub mod record;
pub mod settings;
pub mod summary;
pub mod sync;
pub mod version;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::resolve_home;
use crate::error::{Error, Result};
use crate::storage::{LocalState, StateFile, SyncMeta};
use crate::store::{Scope, Store};

/// The loaded home directory: store plus sync bookkeeping.
///
/// Every command opens one, mutates the store, and saves it back.
pub struct Workspace {
    home: PathBuf,
    file: StateFile,
    pub store: Store,
    pub meta: SyncMeta,
}

impl Workspace {
    /// Load the state file under the resolved home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined or the state
    /// file cannot be read.
    pub fn open(home: Option<&Path>) -> Result<Self> {
        let home = resolve_home(home).ok_or_else(|| {
            Error::Config("Could not determine a home directory; pass --home".to_string())
        })?;
        let file = StateFile::in_home(&home);
        let LocalState { state, sync } = file.load(SystemClock.now_ms())?;
        debug!(home = %home.display(), "Opened workspace");

        Ok(Self {
            home,
            file,
            store: Store::new(state),
            meta: sync,
        })
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    #[must_use]
    pub fn state_path(&self) -> &Path {
        self.file.path()
    }

    /// Write the current state and sync bookkeeping.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn save(&self) -> Result<()> {
        self.file.save(&self.store.state(), &self.meta)
    }
}

/// Parse `YEAR/MONTH/DAY` into container keys.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] unless the input has three numeric parts.
pub fn parse_date(input: &str) -> Result<(String, String, String)> {
    match split_keys(input).as_deref() {
        Some([year, month, day]) => Ok((year.clone(), month.clone(), day.clone())),
        _ => Err(Error::InvalidDate(input.to_string())),
    }
}

/// Parse `all`, `YEAR`, `YEAR/MONTH` or `YEAR/MONTH/DAY`.
///
/// # Errors
///
/// Returns [`Error::InvalidDate`] for anything else.
pub fn parse_scope(input: &str) -> Result<Scope> {
    if input.trim().eq_ignore_ascii_case("all") {
        return Ok(Scope::All);
    }
    match split_keys(input).as_deref() {
        Some([year]) => Ok(Scope::year(year)),
        Some([year, month]) => Ok(Scope::month(year, month)),
        Some([year, month, day]) => Ok(Scope::day(year, month, day)),
        _ => Err(Error::InvalidDate(input.to_string())),
    }
}

fn split_keys(input: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = input.trim().split('/').map(|p| p.trim().to_string()).collect();
    parts
        .iter()
        .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        .then_some(parts)
}

/// Print a value as a single JSON line.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("1403/05/12").unwrap(),
            ("1403".to_string(), "05".to_string(), "12".to_string())
        );
        assert!(matches!(parse_date("1403/05"), Err(Error::InvalidDate(_))));
        assert!(matches!(parse_date("1403/may/12"), Err(Error::InvalidDate(_))));
        assert!(matches!(parse_date("1403//12"), Err(Error::InvalidDate(_))));
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope("ALL").unwrap(), Scope::All);
        assert_eq!(parse_scope("1403").unwrap(), Scope::year("1403"));
        assert_eq!(parse_scope("1403/05").unwrap(), Scope::month("1403", "05"));
        assert_eq!(parse_scope("1403/05/12").unwrap(), Scope::day("1403", "05", "12"));
        assert!(parse_scope("1403/05/12/1").is_err());
        assert!(parse_scope("").is_err());
    }
}
