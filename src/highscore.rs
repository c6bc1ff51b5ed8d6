//! High score and its persistence
//!
//! The engine never does I/O. The session reads the high score once at startup
//! and writes it only when a run ends with a better score.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Best score so far. Serialized as a bare number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScore(pub u32);

impl HighScore {
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Record a finished run. Returns true if `score` is a new best.
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.0 {
            self.0 = score;
            true
        } else {
            false
        }
    }
}

/// Failure talking to durable storage
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("high score I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("high score is not a valid number: {0}")]
    Json(#[from] serde_json::Error),
    #[error("high score storage unavailable")]
    Unavailable,
}

/// Durable home of the high score
pub trait HighScoreStore {
    fn load(&self) -> Result<HighScore, StoreError>;
    fn save(&mut self, high_score: HighScore) -> Result<(), StoreError>;
}

/// Keeps the high score in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub value: HighScore,
    /// Number of successful saves
    pub writes: u32,
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> Result<HighScore, StoreError> {
        Ok(self.value)
    }

    fn save(&mut self, high_score: HighScore) -> Result<(), StoreError> {
        self.value = high_score;
        self.writes += 1;
        Ok(())
    }
}

/// High score in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> Result<HighScore, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(json.trim())?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HighScore::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&mut self, high_score: HighScore) -> Result<(), StoreError> {
        let json = serde_json::to_string(&high_score)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, json)?;
        log::info!("High score {} saved to {}", high_score.get(), self.path.display());
        Ok(())
    }
}

/// High score in browser LocalStorage under [`crate::consts::HIGH_SCORE_KEY`]
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StoreError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StoreError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> Result<HighScore, StoreError> {
        let storage = Self::storage()?;
        match storage
            .get_item(crate::consts::HIGH_SCORE_KEY)
            .map_err(|_| StoreError::Unavailable)?
        {
            Some(value) => Ok(serde_json::from_str(&value)?),
            None => Ok(HighScore::default()),
        }
    }

    fn save(&mut self, high_score: HighScore) -> Result<(), StoreError> {
        let storage = Self::storage()?;
        storage
            .set_item(
                crate::consts::HIGH_SCORE_KEY,
                &serde_json::to_string(&high_score)?,
            )
            .map_err(|_| StoreError::Unavailable)?;
        log::info!("High score {} saved", high_score.get());
        Ok(())
    }
}
