//! Endpoint generation for particle fields and discrete instances.

use std::f32::consts::TAU;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::volume::{rotation_seed, ConeVolume, SphereVolume};

/// Both endpoints of one discrete entity plus its fixed look.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Reflect)]
pub struct DualPosition {
    pub scatter_position: Vec3,
    pub assembled_position: Vec3,
    /// Euler XYZ angles the entity settles to once assembled.
    pub rotation_seed: Vec3,
    pub scale: f32,
}

/// Per-particle random values used for visual variance only.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct ParticleAttributes {
    /// Uniform in `[0, 1)`.
    pub random: f32,
    /// Blink phase in `[0, 2π)`.
    pub phase: f32,
    /// Blink angular speed in `[2, 7)`.
    pub twinkle_speed: f32,
}

impl ParticleAttributes {
    pub fn sample(rng: &mut fastrand::Rng) -> Self {
        Self {
            random: rng.f32(),
            phase: rng.f32() * TAU,
            twinkle_speed: 2.0 + rng.f32() * 5.0,
        }
    }
}

/// Flat buffers for a bulk particle field, indexed by particle.
#[derive(Clone, Debug, Default)]
pub struct FieldData {
    pub scatter_positions: Vec<Vec3>,
    pub assembled_positions: Vec<Vec3>,
    pub attributes: Vec<ParticleAttributes>,
}

impl FieldData {
    pub fn len(&self) -> usize {
        self.scatter_positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scatter_positions.is_empty()
    }
}

/// Discrete ornament flavours.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Reflect)]
pub enum OrnamentKind {
    /// Small baubles hugging the silhouette surface.
    #[default]
    Light,
    /// Larger boxes sitting slightly inside the silhouette.
    Heavy,
}

impl OrnamentKind {
    pub const ALL: [Self; 2] = [Self::Light, Self::Heavy];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Heavy => "Heavy",
        }
    }

    /// Factor applied to the cone base radius for assembled positions.
    pub fn radius_factor(&self) -> f32 {
        match self {
            Self::Light => 0.95,
            Self::Heavy => 0.8,
        }
    }

    /// `(min, span)` of the uniform scale draw.
    pub fn scale_range(&self) -> (f32, f32) {
        match self {
            Self::Light => (0.15, 0.15),
            Self::Heavy => (0.3, 0.3),
        }
    }
}

/// Half-width of the horizontal jitter applied to assembled ornament positions.
pub const ORNAMENT_JITTER: f32 = 0.25;

/// The two volumes every endpoint is drawn from.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Reflect)]
#[serde(default)]
pub struct Distribution {
    pub scatter: SphereVolume,
    pub tree: ConeVolume,
}

impl Distribution {
    pub fn new(scatter: SphereVolume, tree: ConeVolume) -> Self {
        Self { scatter, tree }
    }

    /// Random source for generation: reproducible when seeded.
    pub fn rng(seed: Option<u64>) -> fastrand::Rng {
        match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }

    /// Generate endpoint and attribute buffers for `count` field particles.
    pub fn generate_field(&self, count: usize, rng: &mut fastrand::Rng) -> FieldData {
        let mut data = FieldData {
            scatter_positions: Vec::with_capacity(count),
            assembled_positions: Vec::with_capacity(count),
            attributes: Vec::with_capacity(count),
        };

        for i in 0..count {
            data.assembled_positions
                .push(self.tree.spiral_point(i, count, rng));
            data.scatter_positions.push(self.scatter.sample(rng));
            data.attributes.push(ParticleAttributes::sample(rng));
        }

        data
    }

    /// Generate endpoints for `count` discrete ornaments of `kind`.
    pub fn generate_instances(
        &self,
        count: usize,
        kind: OrnamentKind,
        rng: &mut fastrand::Rng,
    ) -> Vec<DualPosition> {
        let tree = self.tree.scaled_radius(kind.radius_factor());
        let (scale_min, scale_span) = kind.scale_range();

        (0..count)
            .map(|i| {
                let mut assembled = tree.spiral_point(i, count, rng);
                assembled.x += (rng.f32() - 0.5) * 2.0 * ORNAMENT_JITTER;
                assembled.z += (rng.f32() - 0.5) * 2.0 * ORNAMENT_JITTER;

                DualPosition {
                    scatter_position: self.scatter.sample(rng),
                    assembled_position: assembled,
                    rotation_seed: rotation_seed(rng),
                    scale: scale_min + rng.f32() * scale_span,
                }
            })
            .collect()
    }

    /// Scatter endpoint for a single free-standing entity (e.g. the topper).
    pub fn scatter_point(&self, rng: &mut fastrand::Rng) -> Vec3 {
        self.scatter.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_sizes_match_count() {
        let dist = Distribution::default();
        let mut rng = fastrand::Rng::with_seed(1);
        for count in [0, 1, 7, 300] {
            let field = dist.generate_field(count, &mut rng);
            assert_eq!(field.scatter_positions.len(), count);
            assert_eq!(field.assembled_positions.len(), count);
            assert_eq!(field.attributes.len(), count);
        }
    }

    #[test]
    fn large_field_has_no_nan() {
        let dist = Distribution::default();
        let mut rng = fastrand::Rng::with_seed(12_000);
        let field = dist.generate_field(12_000, &mut rng);

        assert_eq!(field.len(), 12_000);
        assert_eq!(field.assembled_positions.len(), 12_000);
        assert_eq!(field.attributes.len(), 12_000);
        assert!(field.scatter_positions.iter().all(|p| p.is_finite()));
        assert!(field.assembled_positions.iter().all(|p| p.is_finite()));
        assert!(field.attributes.iter().all(|a| {
            a.random.is_finite() && a.phase.is_finite() && a.twinkle_speed.is_finite()
        }));
    }

    #[test]
    fn field_endpoints_stay_in_their_volumes() {
        let dist = Distribution::default();
        let mut rng = fastrand::Rng::with_seed(99);
        let field = dist.generate_field(2_000, &mut rng);

        for p in &field.scatter_positions {
            assert!(p.length() <= dist.scatter.radius + 1e-4);
        }
        for p in &field.assembled_positions {
            assert!(p.y.abs() <= dist.tree.half_height() + 1e-4);
            let bound = dist.tree.base_radius
                * (1.0 - (p.y + dist.tree.half_height()) / dist.tree.height);
            assert!(Vec2::new(p.x, p.z).length() <= bound + 1e-3);
        }
    }

    #[test]
    fn attributes_fall_in_documented_ranges() {
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..1_000 {
            let a = ParticleAttributes::sample(&mut rng);
            assert!((0.0..1.0).contains(&a.random));
            assert!((0.0..TAU).contains(&a.phase));
            assert!((2.0..7.0).contains(&a.twinkle_speed));
        }
    }

    #[test]
    fn instances_follow_kind_ranges() {
        let dist = Distribution::default();
        let mut rng = fastrand::Rng::with_seed(11);

        for kind in OrnamentKind::ALL {
            let items = dist.generate_instances(250, kind, &mut rng);
            assert_eq!(items.len(), 250);

            let (min, span) = kind.scale_range();
            let radius = dist.tree.base_radius * kind.radius_factor();
            for item in &items {
                assert!(item.scale >= min && item.scale < min + span);
                assert_eq!(item.rotation_seed.z, 0.0);
                let radial = Vec2::new(item.assembled_position.x, item.assembled_position.z)
                    .length();
                // Jitter can push a point at most sqrt(2) * 0.25 past the scaled taper.
                assert!(radial <= radius + ORNAMENT_JITTER * 2f32.sqrt() + 1e-3);
                assert!(item.scatter_position.length() <= dist.scatter.radius + 1e-4);
            }
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let dist = Distribution::default();
        let a = dist.generate_instances(40, OrnamentKind::Heavy, &mut Distribution::rng(Some(8)));
        let b = dist.generate_instances(40, OrnamentKind::Heavy, &mut Distribution::rng(Some(8)));
        assert_eq!(a, b);
    }

    #[test]
    fn distribution_round_trips_through_ron() {
        let dist = Distribution::new(SphereVolume::new(20.0), ConeVolume::new(9.0, 3.0));
        let text = ron::to_string(&dist).unwrap();
        let back: Distribution = ron::from_str(&text).unwrap();
        assert_eq!(dist, back);
    }
}
