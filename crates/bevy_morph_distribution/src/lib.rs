//! # bevy_morph_distribution
//!
//! Stateless generators for the two endpoint configurations of a morphing
//! scene: a volume-uniform scattered cloud inside a sphere, and a golden-angle
//! spiral filling an upright cone.
//!
//! Output is computed once per entity set and never mutated afterwards.
//! Every generator takes an explicit [`fastrand::Rng`], so a seeded source
//! gives reproducible scenes and an unseeded one gives a fresh scene per run.
//!
//! ```
//! use bevy_morph_distribution::prelude::*;
//!
//! let dist = Distribution::default();
//! let mut rng = Distribution::rng(Some(42));
//! let field = dist.generate_field(1_000, &mut rng);
//! assert_eq!(field.len(), 1_000);
//!
//! let ornaments = dist.generate_instances(50, OrnamentKind::Heavy, &mut rng);
//! assert_eq!(ornaments.len(), 50);
//! ```

pub mod generate;
pub mod volume;

pub use generate::{
    DualPosition, Distribution, FieldData, OrnamentKind, ParticleAttributes, ORNAMENT_JITTER,
};
pub use volume::{ConeVolume, SphereVolume, GOLDEN_ANGLE};

/// Convenient re-exports of commonly used types.
pub mod prelude {
    pub use crate::generate::{
        DualPosition, Distribution, FieldData, OrnamentKind, ParticleAttributes,
    };
    pub use crate::volume::{ConeVolume, SphereVolume, GOLDEN_ANGLE};
}
