//! Engine configuration and preferences
//!
//! Persisted in LocalStorage on the web; read from the environment natively.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where the penalty `POST` goes
    pub penalty_endpoint: String,
    /// Finishers required to end a race (1-8)
    pub difficulty: u8,
    /// Dust specks per race
    pub dust_count: usize,
    /// Draw racer trails
    pub trails: bool,
    /// Fixed RNG seed; `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            penalty_endpoint: PENALTY_ENDPOINT.to_string(),
            difficulty: DEFAULT_DIFFICULTY,
            dust_count: DUST_COUNT,
            trails: true,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Clamp out-of-range values into their valid bounds
    pub fn sanitized(mut self) -> Self {
        let clamped = self.difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        if clamped != self.difficulty {
            log::warn!(
                "Difficulty {} out of range, clamped to {}",
                self.difficulty,
                clamped
            );
            self.difficulty = clamped;
        }
        if self.dust_count > MAX_DUST_COUNT {
            log::warn!(
                "Dust count {} too high, clamped to {}",
                self.dust_count,
                MAX_DUST_COUNT
            );
            self.dust_count = MAX_DUST_COUNT;
        }
        self
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "micro_derby_config";

    /// Load configuration from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(config) = serde_json::from_str::<EngineConfig>(&json) {
                    log::info!("Loaded config from LocalStorage");
                    return config.sanitized();
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save configuration to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Defaults overridden by `MICRO_DERBY_*` environment variables
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }

    /// Apply overrides from a key lookup; unparsable values are ignored
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("MICRO_DERBY_ENDPOINT") {
            config.penalty_endpoint = endpoint;
        }
        if let Some(raw) = lookup("MICRO_DERBY_DIFFICULTY") {
            match raw.parse() {
                Ok(difficulty) => config.difficulty = difficulty,
                Err(_) => log::warn!("Ignoring MICRO_DERBY_DIFFICULTY={:?}", raw),
            }
        }
        if let Some(raw) = lookup("MICRO_DERBY_SEED") {
            match raw.parse() {
                Ok(seed) => config.seed = Some(seed),
                Err(_) => log::warn!("Ignoring MICRO_DERBY_SEED={:?}", raw),
            }
        }
        config.sanitized()
    }
}
