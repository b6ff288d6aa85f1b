//! Overlay settings.
//!
//! One plain structure supplied once at construction. There is no
//! on-disk representation; the host hands these over as-is (they are
//! serde-friendly so a GUI shell can pass them across its boundary).
//!
//! The defaults are the production constants: a 40 minute countdown
//! with a 5 minute grace window, a five-symbol progress palette and
//! fast-cycling warning palettes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How the remaining time is rendered by the primary display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayGranularity {
    /// Whole minutes remaining, biased by `minute_bias_secs` before
    /// flooring so a fresh timer reads its full length for a few ticks.
    Minutes,
    /// `MM:SS` of the rounded remaining time.
    MinutesSeconds,
}

/// Overlay settings, immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySettings {
    /// Nominal countdown length in seconds.
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,
    /// Extra seconds after expiry before the overlay goes to overtime.
    #[serde(default = "default_grace_secs")]
    pub grace_secs: f64,

    /// Progress symbols cycled once over the whole countdown.
    #[serde(default = "default_good_palette")]
    pub good_palette: Vec<String>,
    /// Warning symbols cycled while in the grace window.
    #[serde(default = "default_grace_palette")]
    pub grace_palette: Vec<String>,
    /// Alert symbols cycled while in overtime.
    #[serde(default = "default_overtime_palette")]
    pub overtime_palette: Vec<String>,

    /// Optional second indicator slot appended after the prefix symbol.
    /// Empty palettes disable the slot for that status.
    #[serde(default)]
    pub good_suffix_palette: Vec<String>,
    #[serde(default)]
    pub grace_suffix_palette: Vec<String>,
    #[serde(default)]
    pub overtime_suffix_palette: Vec<String>,

    /// Fixed cycle period while in grace, in seconds.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: f64,
    /// Fixed cycle period while in overtime, in seconds.
    #[serde(default = "default_overtime_period_secs")]
    pub overtime_period_secs: f64,

    /// Horizontal inset from the screen edge when placed in a corner.
    #[serde(default = "default_padding")]
    pub xpadding: f64,
    /// Vertical inset from the screen edge when placed in a corner.
    #[serde(default = "default_padding")]
    pub ypadding: f64,

    #[serde(default = "default_display")]
    pub display: DisplayGranularity,
    /// Seconds added to the remaining time before the minutes-only
    /// floor, so 40:00 reads "40" rather than "39" right after start.
    #[serde(default = "default_minute_bias_secs")]
    pub minute_bias_secs: f64,

    /// Refresh interval for the primary (summary) surface.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: f64,
    /// Refresh interval for the stuck companion surface.
    #[serde(default = "default_companion_tick_secs")]
    pub companion_tick_secs: f64,
}

impl OverlaySettings {
    /// Reject settings no component can be built from.
    ///
    /// Empty *suffix* palettes are fine (the slot is simply disabled);
    /// the prefix palettes must each hold at least one symbol.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_secs <= 0.0 {
            return Err(ConfigError::NonPositiveDuration {
                secs: self.duration_secs,
            });
        }
        if self.grace_secs <= 0.0 {
            return Err(ConfigError::NonPositiveGrace {
                secs: self.grace_secs,
            });
        }
        for (name, palette) in [
            ("good_palette", &self.good_palette),
            ("grace_palette", &self.grace_palette),
            ("overtime_palette", &self.overtime_palette),
        ] {
            if palette.is_empty() {
                return Err(ConfigError::EmptyPalette { palette: name });
            }
        }
        for (which, secs) in [
            ("grace cycle", self.grace_period_secs),
            ("overtime cycle", self.overtime_period_secs),
            ("summary tick", self.tick_secs),
            ("companion tick", self.companion_tick_secs),
        ] {
            if secs <= 0.0 {
                return Err(ConfigError::NonPositivePeriod { which, secs });
            }
        }
        for (axis, value) in [("x", self.xpadding), ("y", self.ypadding)] {
            if value < 0.0 {
                return Err(ConfigError::NegativePadding { axis, value });
            }
        }
        Ok(())
    }
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            grace_secs: default_grace_secs(),
            good_palette: default_good_palette(),
            grace_palette: default_grace_palette(),
            overtime_palette: default_overtime_palette(),
            good_suffix_palette: Vec::new(),
            grace_suffix_palette: Vec::new(),
            overtime_suffix_palette: Vec::new(),
            grace_period_secs: default_grace_period_secs(),
            overtime_period_secs: default_overtime_period_secs(),
            xpadding: default_padding(),
            ypadding: default_padding(),
            display: default_display(),
            minute_bias_secs: default_minute_bias_secs(),
            tick_secs: default_tick_secs(),
            companion_tick_secs: default_companion_tick_secs(),
        }
    }
}

// Default functions
fn default_duration_secs() -> f64 {
    40.0 * 60.0
}
fn default_grace_secs() -> f64 {
    5.0 * 60.0
}
fn default_good_palette() -> Vec<String> {
    vec![
        "🟢".into(),
        "🔵".into(),
        "🟣".into(),
        "🟡".into(),
        "🟠".into(),
    ]
}
fn default_grace_palette() -> Vec<String> {
    vec!["⚠️".into(), "✋".into(), "🙉".into()]
}
fn default_overtime_palette() -> Vec<String> {
    vec!["🔴".into(), "⭕️".into(), "❌".into(), "🛑".into()]
}
fn default_grace_period_secs() -> f64 {
    4.0
}
fn default_overtime_period_secs() -> f64 {
    1.0
}
fn default_padding() -> f64 {
    5.0
}
fn default_display() -> DisplayGranularity {
    DisplayGranularity::Minutes
}
fn default_minute_bias_secs() -> f64 {
    15.0
}
fn default_tick_secs() -> f64 {
    1.0
}
fn default_companion_tick_secs() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(OverlaySettings::default().validate().is_ok());
    }

    #[test]
    fn empty_prefix_palette_rejected() {
        let settings = OverlaySettings {
            grace_palette: Vec::new(),
            ..OverlaySettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::EmptyPalette {
                palette: "grace_palette"
            })
        );
    }

    #[test]
    fn empty_suffix_palette_allowed() {
        let settings = OverlaySettings {
            good_suffix_palette: Vec::new(),
            ..OverlaySettings::default()
        };
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn non_positive_duration_rejected() {
        let settings = OverlaySettings {
            duration_secs: 0.0,
            ..OverlaySettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn non_positive_period_rejected() {
        let settings = OverlaySettings {
            overtime_period_secs: -1.0,
            ..OverlaySettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonPositivePeriod { .. })
        ));
    }

    #[test]
    fn negative_padding_rejected() {
        let settings = OverlaySettings {
            ypadding: -2.0,
            ..OverlaySettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::NegativePadding {
                axis: "y",
                value: -2.0
            })
        );
    }

    #[test]
    fn unknown_fields_use_defaults() {
        let settings: OverlaySettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.duration_secs, 40.0 * 60.0);
        assert_eq!(settings.good_palette.len(), 5);
        assert_eq!(settings.display, DisplayGranularity::Minutes);
    }
}
