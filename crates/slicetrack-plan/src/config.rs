//! Planner layout and scale configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// Reference pitch for slice 0 (C-4 in the tracker's 1..96 note numbering).
pub const DEFAULT_BASE_PITCH: i32 = 48;

/// Major scale intervals in semitones.
pub const DEFAULT_SCALE_INTERVALS: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Default number of tracker channels.
pub const DEFAULT_CHANNEL_COUNT: usize = 4;

/// Default number of patterns.
pub const DEFAULT_PATTERN_COUNT: usize = 4;

/// Default pattern length in rows.
pub const DEFAULT_ROWS_PER_PATTERN: usize = 64;

/// Default distance in rows between successive notes.
pub const DEFAULT_ROW_SPACING: usize = 8;

/// Default extraction sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Settings for [`crate::plan`].
///
/// Every field has a default, so a JSON file only needs to name the fields
/// it overrides:
///
/// ```json
/// { "base_pitch": 36, "scale_intervals": [0, 3, 5, 7, 10] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Pitch assigned to slice 0.
    pub base_pitch: i32,
    /// Semitone offsets cycled through, one octave per full cycle.
    pub scale_intervals: Vec<i32>,
    /// Number of channels in each pattern.
    pub channel_count: usize,
    /// Number of patterns in the song.
    pub pattern_count: usize,
    /// Rows in each pattern.
    pub rows_per_pattern: usize,
    /// Rows between successive notes before wrapping.
    pub row_spacing: usize,
    /// Sample rate requested from the sample provider.
    pub sample_rate: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            base_pitch: DEFAULT_BASE_PITCH,
            scale_intervals: DEFAULT_SCALE_INTERVALS.to_vec(),
            channel_count: DEFAULT_CHANNEL_COUNT,
            pattern_count: DEFAULT_PATTERN_COUNT,
            rows_per_pattern: DEFAULT_ROWS_PER_PATTERN,
            row_spacing: DEFAULT_ROW_SPACING,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl PlannerConfig {
    /// Parse a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, PlanError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlanError::InvalidConfig(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, PlanError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlanError::InvalidConfig(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Check that the layout is usable.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.scale_intervals.is_empty() {
            return Err(PlanError::InvalidConfig(
                "scale_intervals must not be empty".to_string(),
            ));
        }
        let counts = [
            ("channel_count", self.channel_count),
            ("pattern_count", self.pattern_count),
            ("rows_per_pattern", self.rows_per_pattern),
            ("row_spacing", self.row_spacing),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(PlanError::InvalidConfig(format!("{} must be at least 1", name)));
            }
        }
        if self.sample_rate == 0 {
            return Err(PlanError::InvalidConfig(
                "sample_rate must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_layout() {
        let config = PlannerConfig::default();
        assert_eq!(config.base_pitch, 48);
        assert_eq!(config.scale_intervals, vec![0, 2, 4, 5, 7, 9, 11]);
        assert_eq!(config.channel_count, 4);
        assert_eq!(config.pattern_count, 4);
        assert_eq!(config.rows_per_pattern, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlannerConfig::from_json(r#"{"base_pitch": 36}"#).unwrap();
        assert_eq!(
            config,
            PlannerConfig {
                base_pitch: 36,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = PlannerConfig::from_json(r#"{"bass_pitch": 36}"#);
        assert!(matches!(result, Err(PlanError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_scale_rejected() {
        let config = PlannerConfig {
            scale_intervals: vec![],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_counts_rejected() {
        for config in [
            PlannerConfig {
                channel_count: 0,
                ..Default::default()
            },
            PlannerConfig {
                pattern_count: 0,
                ..Default::default()
            },
            PlannerConfig {
                rows_per_pattern: 0,
                ..Default::default()
            },
            PlannerConfig {
                row_spacing: 0,
                ..Default::default()
            },
            PlannerConfig {
                sample_rate: 0,
                ..Default::default()
            },
        ] {
            assert!(config.validate().is_err(), "{:?}", config);
        }
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.json");
        std::fs::write(&path, r#"{"pattern_count": 2, "rows_per_pattern": 32}"#).unwrap();

        let config = PlannerConfig::from_path(&path).unwrap();
        assert_eq!(config.pattern_count, 2);
        assert_eq!(config.rows_per_pattern, 32);

        let missing = PlannerConfig::from_path(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(PlanError::InvalidConfig(_))));
    }
}
