//! Zone configuration for the counting engine

use crate::zones::ZoneSet;
use traffic_core::{Anchor, CoreError, CoreResult, ExitZoneId, Polygon};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Entry/exit polygons of one camera view plus display labels.
///
/// Omitted zone lists fall back to the reference geometry. Omitted labels
/// fall back to the reference labels only when both zone lists do too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ZoneConfigRecord")]
pub struct ZoneConfig {
    /// Point of each bounding box tested against the zones
    pub anchor: Anchor,
    /// Entry polygons, indexed by position
    pub entry_zones: Vec<Polygon>,
    /// Exit polygons, parallel to `entry_zones`
    pub exit_zones: Vec<Polygon>,
    /// Display label per exit zone
    pub labels: Vec<String>,
}

/// Wire form of [`ZoneConfig`] that remembers which fields were given
#[derive(Deserialize)]
struct ZoneConfigRecord {
    #[serde(default)]
    anchor: Anchor,
    entry_zones: Option<Vec<Polygon>>,
    exit_zones: Option<Vec<Polygon>>,
    labels: Option<Vec<String>>,
}

impl From<ZoneConfigRecord> for ZoneConfig {
    fn from(record: ZoneConfigRecord) -> Self {
        let reference = Self::reference();
        let custom_zones = record.entry_zones.is_some() || record.exit_zones.is_some();

        let labels = match record.labels {
            Some(labels) => labels,
            None if custom_zones => Vec::new(),
            None => reference.labels,
        };

        Self {
            anchor: record.anchor,
            entry_zones: record.entry_zones.unwrap_or(reference.entry_zones),
            exit_zones: record.exit_zones.unwrap_or(reference.exit_zones),
            labels,
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl ZoneConfig {
    /// Four-way intersection geometry for a 1280x720 camera view
    pub fn reference() -> Self {
        let entry_zones = vec![
            Polygon::from_pixels(&[[496, 238], [621, 225], [613, 100], [496, 109]]),
            Polygon::from_pixels(&[
                [1268, 271],
                [1138, 282],
                [1032, 261],
                [878, 269],
                [865, 179],
                [1270, 171],
            ]),
            Polygon::from_pixels(&[[333, 713], [629, 709], [658, 417], [392, 421]]),
            Polygon::from_pixels(&[[129, 449], [258, 311], [4, 311], [0, 441]]),
        ];

        let exit_zones = vec![
            Polygon::from_pixels(&[[629, 225], [746, 225], [708, 92], [621, 96]]),
            Polygon::from_pixels(&[[963, 296], [1042, 388], [1275, 363], [1271, 284]]),
            Polygon::from_pixels(&[[142, 438], [354, 434], [308, 704], [50, 704]]),
            Polygon::from_pixels(&[[0, 313], [76, 307], [161, 286], [236, 213], [3, 225]]),
        ];

        Self {
            anchor: Anchor::Center,
            entry_zones,
            exit_zones,
            labels: ["North", "West", "South", "East"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Check list lengths; warn about polygons that can never trigger
    pub fn validate(&self) -> CoreResult<()> {
        if self.entry_zones.is_empty() {
            return Err(CoreError::configuration("at least one entry/exit zone pair is required"));
        }

        if self.entry_zones.len() != self.exit_zones.len() {
            return Err(CoreError::zone_count_mismatch(
                self.entry_zones.len(),
                self.exit_zones.len(),
            ));
        }

        if !self.labels.is_empty() && self.labels.len() != self.exit_zones.len() {
            return Err(CoreError::label_count_mismatch(
                self.labels.len(),
                self.exit_zones.len(),
            ));
        }

        for (i, polygon) in self.entry_zones.iter().enumerate() {
            if polygon.is_degenerate() {
                warn!("Entry zone {} is degenerate and will never count", i);
            }
        }
        for (i, polygon) in self.exit_zones.iter().enumerate() {
            if polygon.is_degenerate() {
                warn!("Exit zone {} is degenerate and will never count", i);
            }
        }

        Ok(())
    }

    /// Parse and validate a JSON zone description
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let config: ZoneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and build the runtime zone set
    pub fn build_zone_set(&self) -> CoreResult<ZoneSet> {
        self.validate()?;
        ZoneSet::from_polygons(self.entry_zones.clone(), self.exit_zones.clone(), self.anchor)
    }

    /// Display label for an exit zone, falling back to its index
    pub fn label(&self, exit_zone: ExitZoneId) -> String {
        self.labels
            .get(exit_zone.index())
            .cloned()
            .unwrap_or_else(|| format!("Zone {}", exit_zone.index()))
    }

    pub fn zone_count(&self) -> usize {
        self.exit_zones.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use traffic_core::Point;

    #[test]
    fn test_reference_is_valid() {
        let config = ZoneConfig::reference();
        assert!(config.validate().is_ok());
        assert_eq!(config.zone_count(), 4);
        assert_eq!(config.label(ExitZoneId(1)), "West");

        let zones = config.build_zone_set().unwrap();
        assert_eq!(zones.entry_count(), 4);
        assert_eq!(zones.exit_count(), 4);
    }

    #[test]
    fn test_reference_zone_centers_inside() {
        let config = ZoneConfig::reference();
        for (i, entry) in config.entry_zones.iter().enumerate() {
            assert!(!entry.is_degenerate(), "entry zone {i}");
            assert!(entry.contains(&entry.center()), "entry zone {i}");
        }
        assert!(!config.exit_zones[0].contains(&config.entry_zones[0].center()));
    }

    #[test]
    fn test_mismatched_lists_rejected() {
        let mut config = ZoneConfig::reference();
        config.exit_zones.pop();

        assert!(matches!(
            config.validate(),
            Err(CoreError::ZoneCountMismatch { entry: 4, exit: 3 })
        ));
    }

    #[test]
    fn test_label_count_checked() {
        let mut config = ZoneConfig::reference();
        config.labels.truncate(2);
        assert!(matches!(
            config.validate(),
            Err(CoreError::LabelCountMismatch { labels: 2, exits: 4 })
        ));

        config.labels.clear();
        assert!(config.validate().is_ok());
        assert_eq!(config.label(ExitZoneId(3)), "Zone 3");
    }

    #[test]
    fn test_empty_config_rejected() {
        let config = ZoneConfig {
            anchor: Anchor::Center,
            entry_zones: Vec::new(),
            exit_zones: Vec::new(),
            labels: Vec::new(),
        };
        assert!(matches!(config.validate(), Err(CoreError::Configuration(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "anchor": "bottom_center",
            "entry_zones": [[[0, 0], [10, 0], [10, 10]]],
            "exit_zones": [[[20, 0], [30, 0], [30, 10]]],
            "labels": ["Only"]
        }"#;
        let config: ZoneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.anchor, Anchor::BottomCenter);
        assert_eq!(config.entry_zones[0].vertices()[1], Point::new(10.0, 0.0));
        assert!(config.validate().is_ok());

        let defaults: ZoneConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, ZoneConfig::reference());
    }

    #[test]
    fn test_custom_zones_without_labels() {
        let json = r#"{
            "entry_zones": [[[0, 0], [10, 0], [10, 10]], [[20, 0], [30, 0], [30, 10]]],
            "exit_zones": [[[0, 20], [10, 20], [10, 30]], [[20, 20], [30, 20], [30, 30]]]
        }"#;

        let config = ZoneConfig::from_json(json).unwrap();

        assert_eq!(config.zone_count(), 2);
        assert!(config.labels.is_empty());
        assert_eq!(config.label(ExitZoneId(1)), "Zone 1");
    }

    #[test]
    fn test_anchor_only_keeps_reference_labels() {
        let config = ZoneConfig::from_json(r#"{"anchor": "bottom_center"}"#).unwrap();

        assert_eq!(config.anchor, Anchor::BottomCenter);
        assert_eq!(config.label(ExitZoneId(0)), "North");
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            ZoneConfig::from_json("{\"anchor\": 3"),
            Err(CoreError::Serialization(_))
        ));
        assert!(matches!(
            ZoneConfig::from_json(r#"{"exit_zones": []}"#),
            Err(CoreError::ZoneCountMismatch { entry: 4, exit: 0 })
        ));
    }
}
