//! Shared colors and scene constants.

use bevy::prelude::*;

/// Scene palette
pub mod palette {
    use super::*;

    pub const EMERALD_HEX: &str = "#065f46";
    pub const GOLD_HEX: &str = "#ffd700";
    pub const RED_DEEP_HEX: &str = "#881122";
    pub const SILVER_HEX: &str = "#eeeeff";
    pub const TWINKLE_HEX: &str = "#fffae3";

    pub const EMERALD: Color = Color::srgb(0.024, 0.373, 0.275);
    pub const GOLD: Color = Color::srgb(1.0, 0.843, 0.0);
    pub const TWINKLE: Color = Color::srgb(1.0, 0.98, 0.89);

    /// Near-black scene background
    pub const BACKGROUND: Color = Color::srgb(0.0, 0.008, 0.004);
}

/// Ornament and topper look
pub mod ornament {
    /// Metallic finish shared by all ornaments
    pub const METALLIC: f32 = 0.9;
    pub const ROUGHNESS: f32 = 0.2;
    /// Fraction of the base color emitted, so ornaments read in the dark
    pub const EMISSIVE_FACTOR: f32 = 0.2;
    /// UV sphere resolution of light ornaments
    pub const SPHERE_SECTORS: u32 = 32;
    pub const SPHERE_STACKS: u32 = 32;
}

/// Topper star, halo and light
pub mod topper {
    /// Height of the star above the cone apex
    pub const APEX_OFFSET: f32 = 0.5;
    pub const STAR_POINTS: usize = 5;
    pub const STAR_OUTER_RADIUS: f32 = 1.0;
    pub const STAR_INNER_RADIUS: f32 = 0.5;
    pub const STAR_DEPTH: f32 = 0.3;
    /// Halo sphere radius around the star
    pub const HALO_RADIUS: f32 = 2.5;
    /// Halo opacity when fully assembled
    pub const HALO_OPACITY: f32 = 0.15;
    /// Point light intensity when fully assembled, in lumens
    pub const LIGHT_INTENSITY: f32 = 60_000.0;
    pub const LIGHT_RANGE: f32 = 15.0;
}
