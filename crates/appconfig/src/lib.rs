//! Runtime options as an explicit value with a load → validate → apply →
//! save lifecycle. The application constructs one `AppOptions`, passes it
//! by reference into the window loop and UI, and persists it back to the
//! same TOML file when the user changes something.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// User-tunable options persisted between runs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppOptions {
    pub fullscreen: bool,
    pub vsync: bool,
    /// Report the cursor with a top-left origin instead of the default
    /// bottom-left convention.
    pub invert_mouse_y: bool,
    /// UI scale factor, clamped to 1.0–4.0.
    pub ui_scale: f32,
    /// Overlay opacity, clamped to 0.2–1.0.
    pub ui_opacity: f32,
    pub auto_apply: bool,
    /// Seconds between automatic applies of the editor text.
    pub auto_apply_interval: f32,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            fullscreen: false,
            vsync: true,
            invert_mouse_y: false,
            ui_scale: 1.0,
            ui_opacity: 0.75,
            auto_apply: true,
            auto_apply_interval: 1.0,
        }
    }
}

impl AppOptions {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let options: AppOptions = toml::from_str(input)?;
        options.validate()?;
        Ok(options)
    }

    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("options serialize to TOML")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ui_scale.is_finite() || !(1.0..=4.0).contains(&self.ui_scale) {
            return Err(ConfigError::Invalid(format!(
                "ui_scale {} out of range 1.0-4.0",
                self.ui_scale
            )));
        }
        if !self.ui_opacity.is_finite() || !(0.2..=1.0).contains(&self.ui_opacity) {
            return Err(ConfigError::Invalid(format!(
                "ui_opacity {} out of range 0.2-1.0",
                self.ui_opacity
            )));
        }
        if !self.auto_apply_interval.is_finite() || self.auto_apply_interval < 0.05 {
            return Err(ConfigError::Invalid(format!(
                "auto_apply_interval {} must be at least 0.05s",
                self.auto_apply_interval
            )));
        }
        Ok(())
    }

    /// Brings out-of-range values back into their documented bounds; used
    /// for values edited interactively rather than parsed from a file.
    pub fn clamp(&mut self) {
        self.ui_scale = self.ui_scale.clamp(1.0, 4.0);
        self.ui_opacity = self.ui_opacity.clamp(0.2, 1.0);
        self.auto_apply_interval = self.auto_apply_interval.max(0.05);
    }

    /// Loads options from `path`. A missing file yields the defaults so a
    /// fresh install starts without a config; a present-but-broken file is
    /// an error the caller reports.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no options file, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_toml_string())?;
        tracing::debug!(path = %path.display(), "saved options");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
fullscreen = true
vsync = false
invert_mouse_y = true
ui_scale = 2.0
ui_opacity = 0.5
auto_apply = false
auto_apply_interval = 2.5
"#;

    #[test]
    fn parses_sample_config() {
        let options = AppOptions::from_toml_str(SAMPLE).expect("parse options");
        assert!(options.fullscreen);
        assert!(!options.vsync);
        assert!(options.invert_mouse_y);
        assert_eq!(options.ui_scale, 2.0);
        assert_eq!(options.ui_opacity, 0.5);
        assert!(!options.auto_apply);
        assert_eq!(options.auto_apply_interval, 2.5);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options = AppOptions::from_toml_str("fullscreen = true\n").expect("parse");
        assert!(options.fullscreen);
        assert!(options.vsync);
        assert_eq!(options.ui_scale, 1.0);
    }

    #[test]
    fn rejects_out_of_range_scale() {
        let err = AppOptions::from_toml_str("ui_scale = 9.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_zero_apply_interval() {
        let err = AppOptions::from_toml_str("auto_apply_interval = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn clamp_restores_bounds() {
        let mut options = AppOptions {
            ui_scale: 0.1,
            ui_opacity: 2.0,
            auto_apply_interval: 0.0,
            ..Default::default()
        };
        options.clamp();
        assert_eq!(options.ui_scale, 1.0);
        assert_eq!(options.ui_opacity, 1.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("options.toml");
        let options = AppOptions {
            fullscreen: true,
            ui_scale: 1.5,
            ..Default::default()
        };

        options.save(&path).expect("save");
        let loaded = AppOptions::load(&path).expect("load");
        assert_eq!(loaded, options);
    }

    #[test]
    fn load_of_missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = AppOptions::load(&dir.path().join("absent.toml")).expect("load");
        assert_eq!(loaded, AppOptions::default());
    }
}
