//! Toy settings and preferences
//!
//! Shared by every toy; loaded from a JSON file natively and from
//! LocalStorage on the web. Missing fields fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live particles per toy for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 300,
            QualityPreset::Medium => 1500,
            QualityPreset::High => 5000,
        }
    }

    /// Canvas pixels per grid cell for the cellular toys
    pub fn cell_size(&self) -> f32 {
        match self {
            QualityPreset::Low => 8.0,
            QualityPreset::Medium => 5.0,
            QualityPreset::High => 3.0,
        }
    }
}

/// Toy settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (sparks, confetti, snow)
    pub particles: bool,
    /// Translucent clears that leave motion trails
    pub trails: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no trails, calmer effects)
    pub reduced_motion: bool,

    // === Startup ===
    /// Toy to open when none is named
    pub toy: String,
    /// Fixed seed. When absent the web page seeds from the clock and the
    /// headless runner uses seed 1.
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,

            particles: true,
            trails: true,

            master_volume: 0.8,
            muted: false,

            reduced_motion: false,

            toy: "fireworks".to_string(),
            seed: None,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset drops trails for performance
        if preset == QualityPreset::Low {
            self.trails = false;
        }
    }

    /// Effective trails (respects reduced_motion)
    pub fn effective_trails(&self) -> bool {
        self.trails && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.quality.cell_size()
    }

    /// Effective volume (0 when muted)
    pub fn volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "toybox_settings";

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
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let s = Settings::from_json(r#"{ "quality": "high", "seed": 7 }"#).unwrap();
        assert_eq!(s.quality, QualityPreset::High);
        assert_eq!(s.seed, Some(7));
        assert_eq!(s.toy, "fireworks");
        assert!(s.particles);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Settings::from_json("{ quality: ").is_err());
        assert!(Settings::from_json(r#"{ "quality": "ultra" }"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let mut s = Settings::from_preset(QualityPreset::Low);
        s.toy = "sandbox".into();
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_low_preset_drops_trails() {
        let s = Settings::from_preset(QualityPreset::Low);
        assert!(!s.effective_trails());
        assert_eq!(s.max_particles(), 300);
    }

    #[test]
    fn test_particles_off_caps_at_zero() {
        let s = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(s.max_particles(), 0);
    }

    #[test]
    fn test_reduced_motion_and_mute() {
        let s = Settings {
            reduced_motion: true,
            muted: true,
            ..Default::default()
        };
        assert!(!s.effective_trails());
        assert_eq!(s.volume(), 0.0);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Settings::load_file("/nonexistent/toybox.json"),
            Err(crate::ToyError::Io(_))
        ));
    }
}
