//! Viewer settings with persistence
//!
//! Settings are saved to `~/.config/sculptr/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use sculptr_core::{ObjWriteOptions, ViewerConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything the terminal viewer reads from disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where `generate` writes job directories when none is given
    pub output_dir: Option<PathBuf>,
    pub viewer: ViewerConfig,
    pub export: ObjWriteOptions,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sculptr"))
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse settings {:?}", path))
    }

    /// Save settings to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(path) = Self::settings_path() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Output directory for generated jobs, defaulting to `./outputs`
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("outputs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sculptr_core::{CameraMode, ShadingMode};

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut settings = Settings::default();
        settings.output_dir = Some(PathBuf::from("/tmp/jobs"));
        settings.viewer.shading = ShadingMode::Flat;
        settings.viewer.camera.mode = CameraMode::Orbit;
        settings.viewer.camera.fov = 60.0;
        settings.export.precision = 4;

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_object_name_none_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = Settings::default();
        settings.export.object_name = None;
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().export.object_name, None);

        settings.export.object_name = Some("part".to_string());
        settings.save_to(&path).unwrap();
        assert_eq!(
            Settings::load_from(&path).unwrap().export.object_name.as_deref(),
            Some("part")
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[viewer]\nshading = \"flat\"\n\n[viewer.camera]\nmove_speed = 3.0\n")
            .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.viewer.shading, ShadingMode::Flat);
        assert_eq!(settings.viewer.camera.move_speed, 3.0);
        assert_eq!(settings.viewer.camera.fov, 45.0);
        assert_eq!(settings.export, ObjWriteOptions::default());
        assert_eq!(settings.output_dir(), PathBuf::from("outputs"));
    }

    #[test]
    fn test_unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "viewer = 3\n").unwrap();
        assert!(Settings::load_from(&path).is_err());
        assert!(Settings::load_from(&dir.path().join("missing.toml")).is_err());
    }
}
