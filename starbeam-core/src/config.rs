//! Stream configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

// ── On-screen controls level ─────────────────────────────────────

/// Detail level of the on-screen control overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OscLevel {
    /// No overlay.
    Off,
    /// D-pad and face buttons only.
    Simple,
    /// All buttons, sticks and triggers.
    Full,
    /// Pick from the number of attached controllers.
    #[default]
    Auto,
}

/// Input scheme requested by the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlScheme {
    /// Touches forwarded as absolute screen touches.
    #[default]
    Touch,
    /// Touches interpreted as trackpad-style relative motion.
    Trackpad,
    /// Physical gamepads only.
    Gamepad,
}

// ── ControllerSupport ────────────────────────────────────────────

/// Controller state handed to the surface at configure time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ControllerSupport {
    /// Number of physical controllers currently attached.
    pub controller_count: u8,
    /// Overlay level preference from the application settings.
    pub osc_preference: OscLevel,
}

// ── StreamConfig ─────────────────────────────────────────────────

/// Top-level configuration for one streaming session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Video settings.
    pub video: VideoConfig,
    /// Scaling settings.
    pub scaling: ScalingConfig,
    /// Input / overlay settings.
    pub controls: ControlsConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

/// Video settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Requested stream width.
    pub width: u32,
    /// Requested stream height.
    pub height: u32,
    /// Display refresh / target frame rate.
    pub fps: u32,
}

/// Scaling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Run the spatial upscaling pass when the decoded resolution is
    /// below the drawable's native resolution.
    pub upscaling: bool,
}

/// Input / overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Input scheme.
    pub scheme: ControlScheme,
    /// On-screen controls level.
    pub osc_level: OscLevel,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level.
    pub level: String,
    /// Optional log file.
    pub file: String,
}

// ── Defaults ─────────────────────────────────────────────────────

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 60,
        }
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self { upscaling: true }
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            scheme: ControlScheme::Touch,
            osc_level: OscLevel::Auto,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: String::new(),
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl StreamConfig {
    /// Load from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("invalid config {}: {e}; using defaults", path.display());
                Self::default()
            }),
            Err(_) => {
                tracing::info!("no config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write default config to a file.
    pub fn write_default(path: &Path) -> Result<(), crate::error::CoreError> {
        let cfg = Self::default();
        let text = toml::to_string_pretty(&cfg)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let cfg = StreamConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("width"));
        assert!(text.contains("upscaling"));
        assert!(text.contains("osc_level"));
    }

    #[test]
    fn roundtrip_config() {
        let cfg = StreamConfig::default();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let parsed: StreamConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.video.width, 1920);
        assert_eq!(parsed.video.fps, 60);
        assert!(parsed.scaling.upscaling);
        assert_eq!(parsed.controls.osc_level, OscLevel::Auto);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let parsed: StreamConfig = toml::from_str("[video]\nwidth = 1280\nheight = 720\n").unwrap();
        assert_eq!(parsed.video.width, 1280);
        assert_eq!(parsed.video.height, 720);
        // Everything not named keeps its default.
        assert_eq!(parsed.video.fps, 60);
        assert!(parsed.scaling.upscaling);
        assert_eq!(parsed.logging.level, "info");
    }
}
