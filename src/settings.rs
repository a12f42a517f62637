//! Background settings
//!
//! Passed by the host at mount time and optionally persisted in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Ascending milestone thresholds (non-empty, strictly increasing, positive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct Milestones(Vec<u32>);

impl Milestones {
    pub fn new(thresholds: Vec<u32>) -> Result<Self, SettingsError> {
        if thresholds.is_empty() {
            return Err(SettingsError::EmptyMilestones);
        }
        for (index, &value) in thresholds.iter().enumerate() {
            if value == 0 {
                return Err(SettingsError::NonPositiveMilestone { index });
            }
            if index > 0 && value <= thresholds[index - 1] {
                return Err(SettingsError::MilestonesNotIncreasing {
                    index,
                    previous: thresholds[index - 1],
                    value,
                });
            }
        }
        Ok(Self(thresholds))
    }

    pub fn first(&self) -> u32 {
        self.0[0]
    }

    pub fn last(&self) -> u32 {
        self.0[self.0.len() - 1]
    }

    /// Smallest threshold strictly above `count`, or the last one
    pub fn current(&self, count: u32) -> u32 {
        self.0
            .iter()
            .copied()
            .find(|&t| t > count)
            .unwrap_or_else(|| self.last())
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

impl Default for Milestones {
    fn default() -> Self {
        Self(vec![128, 256, 512, 1024])
    }
}

impl TryFrom<Vec<u32>> for Milestones {
    type Error = SettingsError;

    fn try_from(value: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Milestones> for Vec<u32> {
    fn from(value: Milestones) -> Self {
        value.0
    }
}

/// Background settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Desired number of live hazards (0 disables them)
    pub hazard_count: u32,
    /// Progression thresholds
    pub milestones: Milestones,

    // === Visual Effects ===
    /// Screen shake on detonation
    pub screen_shake: bool,
    /// Reduced motion (no shake, no tremble)
    pub reduced_motion: bool,

    // === Reveal overlay ===
    /// Let a dismiss input cut the opening animation short
    pub allow_early_dismiss: bool,
    pub reveal_open_secs: f32,
    pub reveal_close_secs: f32,

    /// Fixed RNG seed (random per session when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hazard_count: 0,
            milestones: Milestones::default(),

            screen_shake: true,
            reduced_motion: false,

            allow_early_dismiss: false,
            reveal_open_secs: 1.2,
            reveal_close_secs: 0.8,

            seed: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON object
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check values serde cannot express
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (name, value) in [
            ("reveal_open_secs", self.reveal_open_secs),
            ("reveal_close_secs", self.reveal_close_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::InvalidDuration { name, value });
            }
        }
        Ok(())
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "carrot_field_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
