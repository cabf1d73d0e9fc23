//! Runner settings
//!
//! Read from an optional JSON file; anything not given falls back to the
//! defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::TICK_MS;
use crate::error::{LevelError, Result};

/// Settings for a game session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Timing ===
    /// Scheduler interval (ms per tick)
    pub tick_ms: u64,
    /// Stop a headless run after this many ticks
    pub max_ticks: Option<u64>,

    // === Simulation ===
    /// RNG seed; picked from the system time when absent
    pub seed: Option<u64>,
    /// Lives at the start of a game
    pub lives: u32,

    // === Content ===
    /// Level files, played in order
    pub levels: Vec<PathBuf>,
    /// How often the runner renders a frame (every N ticks)
    pub render_every: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,
            max_ticks: Some(20_000),
            seed: None,
            lives: 5,
            levels: vec![PathBuf::from("levels/level1.json"), PathBuf::from("levels/level2.json")],
            render_every: 2,
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.levels.is_empty() {
            return Err(LevelError::NoLevels);
        }
        Ok(settings)
    }

    /// Fixed seed, or one derived from the current time
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}
