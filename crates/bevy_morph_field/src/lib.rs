//! # bevy_morph_field
//!
//! Bulk particle fields that morph between a scattered and an assembled
//! configuration, evaluated entirely on the GPU.
//!
//! Endpoint and attribute buffers are baked into a mesh once. Each frame the
//! host writes three scalars (`time`, `progress`, `size_scale`) into the
//! material, so the per-frame host cost is constant regardless of how many
//! particles the field holds.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use bevy_morph_distribution::Distribution;
//! use bevy_morph_field::{create_field_mesh, MorphFieldMaterial, MorphFieldPlugin};
//!
//! fn main() {
//!     App::new()
//!         .add_plugins((DefaultPlugins, MorphFieldPlugin))
//!         .add_systems(Startup, setup)
//!         .run();
//! }
//!
//! fn setup(
//!     mut commands: Commands,
//!     mut meshes: ResMut<Assets<Mesh>>,
//!     mut materials: ResMut<Assets<MorphFieldMaterial>>,
//! ) {
//!     let field = Distribution::default().generate_field(5_000, &mut Distribution::rng(None));
//!     commands.spawn((
//!         Mesh3d(meshes.add(create_field_mesh(&field))),
//!         MeshMaterial3d(materials.add(MorphFieldMaterial::twinkle(LinearRgba::WHITE))),
//!     ));
//! }
//! ```

pub mod contract;
mod material;
mod mesh;

pub use material::{
    FieldStyle, MorphFieldMaterial, MorphFieldPlugin, MorphFieldUniform,
    ATTRIBUTE_ASSEMBLED_POSITION, ATTRIBUTE_PARTICLE,
};
pub use mesh::{create_field_mesh, VERTICES_PER_PARTICLE};
