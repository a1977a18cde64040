use bevy::prelude::*;
use bevy_morph_distribution::{Distribution, OrnamentKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::constants::palette;
use crate::morph::DEFAULT_MORPH_RATE;

/// Number of entities spawned per category
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EntityCounts {
    /// Foliage particles
    pub foliage: usize,
    /// Twinkle lights
    pub twinkle: usize,
    /// Ornament groups, one instanced group each
    pub ornaments: Vec<OrnamentGroupConfig>,
}

impl Default for EntityCounts {
    fn default() -> Self {
        Self {
            foliage: 12_000,
            twinkle: 1_500,
            ornaments: default_ornament_groups(),
        }
    }
}

/// One ornament group: a kind, how many, and its color as a hex string
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrnamentGroupConfig {
    pub kind: OrnamentKind,
    pub count: usize,
    pub color: String,
}

impl OrnamentGroupConfig {
    pub fn new(kind: OrnamentKind, count: usize, color: impl Into<String>) -> Self {
        Self {
            kind,
            count,
            color: color.into(),
        }
    }

    pub fn color(&self) -> Color {
        parse_hex(&self.color, palette::GOLD)
    }
}

fn default_ornament_groups() -> Vec<OrnamentGroupConfig> {
    vec![
        OrnamentGroupConfig::new(OrnamentKind::Light, 200, palette::GOLD_HEX),
        OrnamentGroupConfig::new(OrnamentKind::Heavy, 50, palette::RED_DEEP_HEX),
        OrnamentGroupConfig::new(OrnamentKind::Light, 120, palette::SILVER_HEX),
    ]
}

/// Field and topper colors as hex strings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PaletteConfig {
    /// Foliage base color
    pub foliage: String,
    /// Foliage accent color for the brightest particles
    pub foliage_accent: String,
    /// Twinkle light color
    pub twinkle: String,
    /// Topper star and glow color
    pub topper: String,
    /// Intensity multiplier applied to the twinkle color (HDR)
    pub twinkle_intensity: f32,
}

fn default_twinkle_intensity() -> f32 {
    3.0
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            foliage: palette::EMERALD_HEX.to_string(),
            foliage_accent: palette::GOLD_HEX.to_string(),
            twinkle: palette::TWINKLE_HEX.to_string(),
            topper: palette::GOLD_HEX.to_string(),
            twinkle_intensity: default_twinkle_intensity(),
        }
    }
}

impl PaletteConfig {
    pub fn foliage(&self) -> Color {
        parse_hex(&self.foliage, palette::EMERALD)
    }

    pub fn foliage_accent(&self) -> Color {
        parse_hex(&self.foliage_accent, palette::GOLD)
    }

    /// Twinkle color scaled into HDR range.
    pub fn twinkle(&self) -> LinearRgba {
        let base = parse_hex(&self.twinkle, palette::TWINKLE).to_linear();
        base * self.twinkle_intensity
    }

    pub fn topper(&self) -> Color {
        parse_hex(&self.topper, palette::GOLD)
    }
}

/// Parse a `#rrggbb` string, falling back (with a warning) when it is malformed.
fn parse_hex(hex: &str, fallback: Color) -> Color {
    match Srgba::hex(hex) {
        Ok(color) => color.into(),
        Err(e) => {
            warn!("Invalid color {:?} in config: {}", hex, e);
            fallback
        }
    }
}

/// Tree morph configuration that persists to disk
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TreeMorphConfig {
    /// Scatter sphere and tree cone dimensions
    #[serde(default)]
    pub distribution: Distribution,
    /// Entity counts per category
    #[serde(default)]
    pub counts: EntityCounts,
    /// Exponential approach rate of morph progress, per second
    #[serde(default = "default_morph_rate")]
    pub morph_rate: f32,
    /// Colors
    #[serde(default)]
    pub palette: PaletteConfig,
    /// Fixed seed for reproducible layouts (None = fresh layout every run)
    #[serde(default)]
    pub seed: Option<u64>,
    /// World-space particle size unit
    #[serde(default = "default_size_unit")]
    pub size_unit: f32,
    /// Whether the tree starts formed
    #[serde(default = "default_start_assembled")]
    pub start_assembled: bool,
}

fn default_morph_rate() -> f32 {
    DEFAULT_MORPH_RATE
}

fn default_size_unit() -> f32 {
    bevy_morph_field::MorphFieldMaterial::DEFAULT_SIZE_SCALE
}

fn default_start_assembled() -> bool {
    true
}

impl Default for TreeMorphConfig {
    fn default() -> Self {
        Self {
            distribution: Distribution::default(),
            counts: EntityCounts::default(),
            morph_rate: default_morph_rate(),
            palette: PaletteConfig::default(),
            seed: None,
            size_unit: default_size_unit(),
            start_assembled: default_start_assembled(),
        }
    }
}

impl TreeMorphConfig {
    /// Get the config file path
    pub fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("bevy_tree_morph");
            p.push("config.ron");
            p
        })
    }

    /// Parse a config from RON text.
    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// Load config from disk, or return defaults if missing or invalid
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            warn!("Could not determine config directory, using default tree config");
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(content) => match Self::from_ron(&content) {
                Ok(config) => {
                    info!("Tree config loaded from: {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse {:?}, using defaults: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => {
                info!("No tree config at {:?}, using defaults", path);
                Self::default()
            }
        }
    }

    /// Save config to disk
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            error!("Could not determine config directory");
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {}", e);
                return;
            }
        }

        match ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    error!("Failed to save tree config: {}", e);
                } else {
                    info!("Tree config saved to: {:?}", path);
                }
            }
            Err(e) => {
                error!("Failed to serialize tree config: {}", e);
            }
        }
    }

    /// Total number of ornament instances across all groups.
    pub fn ornament_count(&self) -> usize {
        self.counts.ornaments.iter().map(|g| g.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_scene() {
        let config = TreeMorphConfig::default();
        assert_eq!(config.counts.foliage, 12_000);
        assert_eq!(config.counts.twinkle, 1_500);
        assert_eq!(config.ornament_count(), 370);
        assert_eq!(config.distribution.scatter.radius, 15.0);
        assert_eq!(config.distribution.tree.height, 12.0);
        assert_eq!(config.distribution.tree.base_radius, 7.5);
        assert_eq!(config.morph_rate, 1.5);
        assert!(config.start_assembled);
        assert!(config.seed.is_none());
    }

    #[test]
    fn round_trips_through_ron() {
        let mut config = TreeMorphConfig::default();
        config.seed = Some(1225);
        config.counts.foliage = 300;

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let parsed = TreeMorphConfig::from_ron(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed = TreeMorphConfig::from_ron("(morph_rate: 3.0, seed: Some(7))").unwrap();
        assert_eq!(parsed.morph_rate, 3.0);
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.counts, EntityCounts::default());
        assert_eq!(parsed.palette, PaletteConfig::default());
        assert_eq!(parsed.size_unit, default_size_unit());
    }

    #[test]
    fn partial_nested_sections_keep_the_rest() {
        let parsed = TreeMorphConfig::from_ron(
            "(counts: (foliage: 5000), palette: (twinkle: \"#ffffff\"), \
             distribution: (tree: (height: 20.0)), seed: Some(3))",
        )
        .unwrap();

        assert_eq!(parsed.counts.foliage, 5000);
        assert_eq!(parsed.counts.twinkle, 1_500);
        assert_eq!(parsed.counts.ornaments, EntityCounts::default().ornaments);
        assert_eq!(parsed.palette.twinkle, "#ffffff");
        assert_eq!(parsed.palette.foliage, palette::EMERALD_HEX);
        assert_eq!(parsed.palette.twinkle_intensity, 3.0);
        assert_eq!(parsed.distribution.tree.height, 20.0);
        assert_eq!(parsed.distribution.tree.base_radius, 7.5);
        assert_eq!(parsed.distribution.scatter.radius, 15.0);
        assert_eq!(parsed.seed, Some(3));
        assert_eq!(parsed.morph_rate, 1.5);
    }

    #[test]
    fn malformed_color_falls_back() {
        let group = OrnamentGroupConfig::new(OrnamentKind::Heavy, 1, "not a color");
        assert_eq!(group.color(), palette::GOLD);

        let group = OrnamentGroupConfig::new(OrnamentKind::Heavy, 1, "#881122");
        assert_eq!(group.color(), Color::from(Srgba::rgb_u8(0x88, 0x11, 0x22)));
    }
}
