//! Static particle mesh built once from generator output.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy_morph_distribution::FieldData;

use crate::material::{ATTRIBUTE_ASSEMBLED_POSITION, ATTRIBUTE_PARTICLE};

/// Quad corners in the order the index pattern expects.
const CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

/// Vertices emitted per particle.
pub const VERTICES_PER_PARTICLE: usize = 4;

/// Build the field mesh: one camera-facing quad per particle.
///
/// Every vertex of a quad carries its particle's scattered endpoint in
/// `POSITION`, the assembled endpoint and randoms in custom attributes, and
/// its corner in `UV_0`. The vertex shader expands the quad in view space.
pub fn create_field_mesh(field: &FieldData) -> Mesh {
    let count = field.len();
    let vertex_count = count * VERTICES_PER_PARTICLE;

    let mut scatter = Vec::with_capacity(vertex_count);
    let mut assembled = Vec::with_capacity(vertex_count);
    let mut particle = Vec::with_capacity(vertex_count);
    let mut corners = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity(count * 6);

    for i in 0..count {
        let s = field.scatter_positions[i].to_array();
        let a = field.assembled_positions[i].to_array();
        let attr = field.attributes[i];
        let packed = [attr.random, attr.phase, attr.twinkle_speed, 0.0];

        for corner in CORNERS {
            scatter.push(s);
            assembled.push(a);
            particle.push(packed);
            corners.push(corner);
        }

        let base = (i * VERTICES_PER_PARTICLE) as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, scatter)
    .with_inserted_attribute(ATTRIBUTE_ASSEMBLED_POSITION, assembled)
    .with_inserted_attribute(ATTRIBUTE_PARTICLE, particle)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
    .with_inserted_indices(Indices::U32(indices))
}
