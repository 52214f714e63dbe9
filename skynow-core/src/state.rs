//! Persisted client state: search history, favorites and theme.
//!
//! Every key is read once when the store opens and rewritten in full on each
//! mutation. Stored values are validated on load; a record that does not
//! parse is discarded and the key starts over empty.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::sync::watch;

use crate::{
    error::{Result, WeatherError},
    model::{GeocodingResult, HistoryEntry},
};

pub const HISTORY_KEY: &str = "weatherHistory";
pub const FAVORITES_KEY: &str = "weatherFavorites";
pub const THEME_KEY: &str = "theme";

pub const HISTORY_LIMIT: usize = 8;
pub const FAVORITES_LIMIT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(WeatherError::Storage(format!(
                "Unknown theme '{other}'. Supported themes: light, dark."
            ))),
        }
    }
}

/// Everything that survives a restart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    pub history: Vec<HistoryEntry>,
    pub favorites: Vec<GeocodingResult>,
    pub theme: Theme,
}

/// Most-recently-used insert: one entry per city, newest first, capped.
pub fn push_history(history: &[HistoryEntry], entry: HistoryEntry) -> Vec<HistoryEntry> {
    let older = history
        .iter()
        .filter(|item| item.city != entry.city)
        .take(HISTORY_LIMIT - 1)
        .cloned();
    std::iter::once(entry.clone()).chain(older).collect()
}

pub fn is_favorite(favorites: &[GeocodingResult], location: &GeocodingResult) -> bool {
    favorites.iter().any(|f| f.same_position(location))
}

/// Removes the location when present, otherwise prepends it. Returns the new
/// list and whether the location is now a favorite.
pub fn toggle_favorite(
    favorites: &[GeocodingResult],
    location: &GeocodingResult,
) -> (Vec<GeocodingResult>, bool) {
    if is_favorite(favorites, location) {
        let next = favorites
            .iter()
            .filter(|f| !f.same_position(location))
            .cloned()
            .collect();
        return (next, false);
    }

    let mut next = Vec::with_capacity(FAVORITES_LIMIT);
    next.push(location.clone());
    next.extend(favorites.iter().take(FAVORITES_LIMIT - 1).cloned());
    (next, true)
}

/// File-backed state with change notification.
#[derive(Debug)]
pub struct StateStore {
    dir: PathBuf,
    state: Mutex<PersistedState>,
    changes: watch::Sender<PersistedState>,
}

impl StateStore {
    /// Reads every key from `dir`. Missing files mean empty state.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        let mut history: Vec<HistoryEntry> = load_list(&dir, HISTORY_KEY)?;
        history.truncate(HISTORY_LIMIT);

        let mut favorites: Vec<GeocodingResult> = load_list(&dir, FAVORITES_KEY)?;
        favorites.truncate(FAVORITES_LIMIT);

        let theme = load_theme(&dir)?;

        let state = PersistedState {
            history,
            favorites,
            theme,
        };
        tracing::debug!(
            dir = %dir.display(),
            history = state.history.len(),
            favorites = state.favorites.len(),
            theme = %state.theme,
            "state loaded"
        );

        let (changes, _) = watch::channel(state.clone());
        Ok(Self {
            dir,
            state: Mutex::new(state),
            changes,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot(&self) -> PersistedState {
        self.state.lock().clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().history.clone()
    }

    pub fn favorites(&self) -> Vec<GeocodingResult> {
        self.state.lock().favorites.clone()
    }

    pub fn theme(&self) -> Theme {
        self.state.lock().theme
    }

    /// Receives the full state after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<PersistedState> {
        self.changes.subscribe()
    }

    pub fn record_history(&self, entry: HistoryEntry) -> Result<Vec<HistoryEntry>> {
        self.update(|state| {
            let next = push_history(&state.history, entry);
            write_json(&self.dir, HISTORY_KEY, &next)?;
            state.history = next.clone();
            Ok(next)
        })
    }

    /// Empties the history and deletes its durable record.
    pub fn clear_history(&self) -> Result<()> {
        self.update(|state| {
            remove_key(&self.dir, HISTORY_KEY)?;
            state.history.clear();
            Ok(())
        })
    }

    pub fn is_favorite(&self, location: &GeocodingResult) -> bool {
        is_favorite(&self.state.lock().favorites, location)
    }

    /// Returns `true` when the location is a favorite after the call.
    pub fn toggle_favorite(&self, location: &GeocodingResult) -> Result<bool> {
        self.update(|state| {
            let (next, added) = toggle_favorite(&state.favorites, location);
            write_json(&self.dir, FAVORITES_KEY, &next)?;
            state.favorites = next;
            Ok(added)
        })
    }

    /// Removes every favorite on the location's coordinates.
    pub fn remove_favorite(&self, location: &GeocodingResult) -> Result<bool> {
        self.update(|state| {
            if !is_favorite(&state.favorites, location) {
                return Ok(false);
            }
            let (next, _) = toggle_favorite(&state.favorites, location);
            write_json(&self.dir, FAVORITES_KEY, &next)?;
            state.favorites = next;
            Ok(true)
        })
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.update(|state| {
            write_raw(&self.dir, THEME_KEY, theme.as_str().as_bytes())?;
            state.theme = theme;
            Ok(())
        })
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        self.update(|state| {
            let next = state.theme.toggled();
            write_raw(&self.dir, THEME_KEY, next.as_str().as_bytes())?;
            state.theme = next;
            Ok(next)
        })
    }

    /// Read-modify-write under the lock, then notify subscribers.
    fn update<T>(&self, mutate: impl FnOnce(&mut PersistedState) -> Result<T>) -> Result<T> {
        let mut state = self.state.lock();
        let out = mutate(&mut *state)?;
        self.changes.send_replace(state.clone());
        Ok(out)
    }
}

fn key_path(dir: &Path, key: &str) -> PathBuf {
    if key == THEME_KEY {
        dir.join(key)
    } else {
        dir.join(format!("{key}.json"))
    }
}

fn storage_err(action: &str, path: &Path, err: impl fmt::Display) -> WeatherError {
    WeatherError::Storage(format!("Failed to {action} {}: {err}", path.display()))
}

fn read_key(dir: &Path, key: &str) -> Result<Option<String>> {
    let path = key_path(dir, key);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(storage_err("read", &path, err)),
    }
}

fn load_list<T: DeserializeOwned>(dir: &Path, key: &str) -> Result<Vec<T>> {
    let Some(contents) = read_key(dir, key)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<T>>(&contents) {
        Ok(items) => Ok(items),
        Err(err) => {
            tracing::warn!(key, error = %err, "discarding invalid stored record");
            remove_key(dir, key)?;
            Ok(Vec::new())
        }
    }
}

fn load_theme(dir: &Path) -> Result<Theme> {
    let Some(contents) = read_key(dir, THEME_KEY)? else {
        return Ok(Theme::default());
    };

    Ok(contents.parse().unwrap_or_else(|err: WeatherError| {
        tracing::warn!(error = %err, "discarding invalid stored theme");
        Theme::default()
    }))
}

fn write_json<T: Serialize>(dir: &Path, key: &str, value: &T) -> Result<()> {
    let payload = serde_json::to_vec(value)
        .map_err(|err| WeatherError::Storage(format!("Failed to serialize {key}: {err}")))?;
    write_raw(dir, key, &payload)
}

/// Writes through a temp file so a crash never leaves a half-written record.
fn write_raw(dir: &Path, key: &str, bytes: &[u8]) -> Result<()> {
    fs::create_dir_all(dir).map_err(|err| storage_err("create", dir, err))?;

    let path = key_path(dir, key);
    let tmp_path = dir.join(format!(".{key}.{}.tmp", std::process::id()));
    fs::write(&tmp_path, bytes).map_err(|err| storage_err("write", &tmp_path, err))?;
    fs::rename(&tmp_path, &path).map_err(|err| storage_err("replace", &path, err))?;
    Ok(())
}

fn remove_key(dir: &Path, key: &str) -> Result<()> {
    let path = key_path(dir, key);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(storage_err("remove", &path, err)),
    }
}
