//! Volumes the generator samples: the scatter sphere and the tree cone.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Angular increment between consecutive spiral points, in radians.
///
/// Successive indices never line up radially, so the cone fills without
/// visible spokes for any point count.
pub const GOLDEN_ANGLE: f32 = 2.399_963;

/// Solid sphere centered on the origin.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct SphereVolume {
    pub radius: f32,
}

impl Default for SphereVolume {
    fn default() -> Self {
        Self { radius: 15.0 }
    }
}

impl SphereVolume {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Sample a point uniformly by volume.
    ///
    /// The radius is drawn as `R * cbrt(U)` so density is proportional to
    /// `r²`; the direction uses the inverse-CDF construction on the sphere.
    pub fn sample(&self, rng: &mut fastrand::Rng) -> Vec3 {
        let theta = TAU * rng.f32();
        let phi = (2.0 * rng.f32() - 1.0).acos();
        let r = rng.f32().cbrt() * self.radius;
        let sin_phi = phi.sin();

        Vec3::new(
            r * sin_phi * theta.cos(),
            r * sin_phi * theta.sin(),
            r * phi.cos(),
        )
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.length() <= self.radius
    }
}

/// Upright cone (the tree silhouette), vertically centered on the origin.
///
/// The base sits at `y = -height / 2` and the apex at `y = height / 2`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
#[serde(default)]
pub struct ConeVolume {
    pub height: f32,
    pub base_radius: f32,
}

impl Default for ConeVolume {
    fn default() -> Self {
        Self {
            height: 12.0,
            base_radius: 7.5,
        }
    }
}

impl ConeVolume {
    pub fn new(height: f32, base_radius: f32) -> Self {
        Self {
            height,
            base_radius,
        }
    }

    /// Same cone with the base radius scaled by `factor`.
    pub fn scaled_radius(&self, factor: f32) -> Self {
        Self {
            height: self.height,
            base_radius: self.base_radius * factor,
        }
    }

    pub fn half_height(&self) -> f32 {
        self.height * 0.5
    }

    /// Radius of the cross-section at world height `y` (zero outside the cone).
    pub fn radius_at(&self, y: f32) -> f32 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let y_norm = (y + self.half_height()) / self.height;
        if !(0.0..=1.0).contains(&y_norm) {
            return 0.0;
        }
        self.base_radius * (1.0 - y_norm)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.y.abs() <= self.half_height()
            && Vec2::new(point.x, point.z).length() <= self.radius_at(point.y)
    }

    /// Point `index` of `total` on the golden-angle spiral.
    ///
    /// Height rises linearly with the index, the local radius tapers to the
    /// apex, and the radial distance is jittered with `sqrt(U)` so the
    /// cross-section disk is filled uniformly instead of tracing its rim.
    pub fn spiral_point(&self, index: usize, total: usize, rng: &mut fastrand::Rng) -> Vec3 {
        let y_norm = if total == 0 {
            0.0
        } else {
            index as f32 / total as f32
        };
        let y = y_norm * self.height - self.half_height();
        let radius = self.base_radius * (1.0 - y_norm);
        let theta = index as f32 * GOLDEN_ANGLE;
        let jittered = radius * rng.f32().sqrt();

        Vec3::new(jittered * theta.cos(), y, jittered * theta.sin())
    }
}

/// Random Euler seed with x and y in `[0, π)`.
pub(crate) fn rotation_seed(rng: &mut fastrand::Rng) -> Vec3 {
    Vec3::new(rng.f32() * PI, rng.f32() * PI, 0.0)
}
