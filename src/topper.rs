//! The star on top of the tree: a single instance with its own hover, spin,
//! emissive pulse and glow.

use std::f32::consts::{PI, TAU};

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy::render::render_resource::Face;

use crate::constants::topper as consts;
use crate::morph::{MorphPlugin, MorphState};
use crate::ornaments::FloatMotion;
use crate::TreeMorphSystems;

/// Progress above which the formed star hovers.
pub const HOVER_THRESHOLD: f32 = 0.9;
const HOVER_SPEED: f32 = 2.0;
const HOVER_AMPLITUDE: f32 = 0.1;
/// Spin speed scattered and formed, rad/s before `SPIN_SCALE`
const SPIN_SCATTERED: f32 = 5.0;
const SPIN_ASSEMBLED: f32 = 0.8;
const SPIN_SCALE: f32 = 0.6;
const TILT_AMPLITUDE: f32 = 0.05;
const PULSE_SPEED: f32 = 3.0;
const PULSE_BASE: f32 = 2.5;
const PULSE_AMPLITUDE: f32 = 1.5;

/// Topper endpoints and accumulated spin angle.
#[derive(Component, Clone, Debug)]
#[require(MorphState)]
pub struct Topper {
    pub scatter_position: Vec3,
    pub assembled_position: Vec3,
    pub motion: FloatMotion,
    /// Current spin about Y, wrapped to `[0, 2π)`
    pub spin: f32,
}

/// Evaluated topper look for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopperPose {
    pub translation: Vec3,
    pub rotation: Quat,
    /// Multiplier on the star's emissive color
    pub emissive_intensity: f32,
    /// Halo and light strength in `[0, 1]`
    pub glow: f32,
}

impl Topper {
    pub fn new(scatter_position: Vec3, assembled_position: Vec3) -> Self {
        Self {
            scatter_position,
            assembled_position,
            motion: FloatMotion::TOPPER,
            spin: 0.0,
        }
    }

    /// Assembled endpoint just above the apex of a cone of `height`.
    pub fn apex(height: f32) -> Vec3 {
        Vec3::new(0.0, height * 0.5 + consts::APEX_OFFSET, 0.0)
    }

    /// Spin speed in rad/s: fast while scattered, a slow turn once formed.
    pub fn spin_speed(progress: f32) -> f32 {
        (SPIN_SCATTERED + (SPIN_ASSEMBLED - SPIN_SCATTERED) * progress) * SPIN_SCALE
    }

    pub fn advance_spin(&mut self, delta_secs: f32, progress: f32) {
        self.spin = (self.spin + Self::spin_speed(progress) * delta_secs).rem_euclid(TAU);
    }

    pub fn pose(&self, elapsed: f32, progress: f32) -> TopperPose {
        let scatter = self.scatter_position + Vec3::Y * self.motion.offset(elapsed, 0.0, progress);
        let mut translation = scatter.lerp(self.assembled_position, progress);
        if progress > HOVER_THRESHOLD {
            translation.y += (elapsed * HOVER_SPEED).sin() * HOVER_AMPLITUDE;
        }

        let tilt = elapsed.sin() * TILT_AMPLITUDE * progress;

        TopperPose {
            translation,
            rotation: Quat::from_euler(EulerRot::XYZ, 0.0, self.spin, tilt),
            emissive_intensity: PULSE_BASE + (elapsed * PULSE_SPEED).sin() * PULSE_AMPLITUDE,
            glow: progress.clamp(0.0, 1.0),
        }
    }
}

/// Materials and light driven by the topper each frame.
#[derive(Component, Clone, Debug)]
pub struct TopperLook {
    pub star_material: Handle<StandardMaterial>,
    pub halo_material: Handle<StandardMaterial>,
    /// Linear emissive color at intensity 1
    pub emissive: LinearRgba,
    pub light: Entity,
}

/// Marks the topper's point light.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TopperLight;

pub struct TopperPlugin;

impl Plugin for TopperPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<MorphPlugin>() {
            app.add_plugins(MorphPlugin);
        }
        app.add_systems(
            Update,
            (
                evaluate_topper.in_set(TreeMorphSystems::Evaluate),
                apply_topper_look
                    .in_set(TreeMorphSystems::Upload)
                    .run_if(resource_exists::<Assets<StandardMaterial>>),
            ),
        );
    }
}

fn evaluate_topper(time: Res<Time>, mut toppers: Query<(&mut Topper, &MorphState, &mut Transform)>) {
    let elapsed = time.elapsed_secs();
    for (mut topper, state, mut transform) in &mut toppers {
        topper.advance_spin(time.delta_secs(), state.progress);
        let pose = topper.pose(elapsed, state.progress);
        transform.translation = pose.translation;
        transform.rotation = pose.rotation;
    }
}

fn apply_topper_look(
    time: Res<Time>,
    toppers: Query<(&Topper, &MorphState, &TopperLook)>,
    mut lights: Query<&mut PointLight, With<TopperLight>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let elapsed = time.elapsed_secs();
    for (topper, state, look) in &toppers {
        let pose = topper.pose(elapsed, state.progress);

        if let Some(star) = materials.get_mut(&look.star_material) {
            star.emissive = look.emissive * pose.emissive_intensity;
        }
        if let Some(halo) = materials.get_mut(&look.halo_material) {
            halo.base_color.set_alpha(consts::HALO_OPACITY * pose.glow);
        }
        if let Ok(mut light) = lights.get_mut(look.light) {
            light.intensity = consts::LIGHT_INTENSITY * pose.glow;
        }
    }
}

/// Spawn the star, its halo and its light.
pub fn spawn_topper(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    topper: Topper,
    color: Color,
    state: MorphState,
) -> Entity {
    let emissive = color.to_linear();
    let star_material = materials.add(StandardMaterial {
        base_color: color,
        emissive: emissive * PULSE_BASE,
        metallic: 1.0,
        perceptual_roughness: 0.1,
        ..default()
    });
    let halo_material = materials.add(StandardMaterial {
        base_color: color.with_alpha(0.0),
        unlit: true,
        alpha_mode: AlphaMode::Add,
        cull_mode: Some(Face::Front),
        ..default()
    });

    let star_handle = meshes.add(star_mesh(
        consts::STAR_POINTS,
        consts::STAR_OUTER_RADIUS,
        consts::STAR_INNER_RADIUS,
        consts::STAR_DEPTH,
    ));
    let halo_handle = meshes.add(Sphere::new(consts::HALO_RADIUS).mesh().uv(32, 32));

    let translation = topper.scatter_position;
    let topper_entity = commands
        .spawn((
            Name::new("Topper"),
            topper,
            state,
            Transform::from_translation(translation),
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        Name::new("Topper Star"),
        Mesh3d(star_handle),
        MeshMaterial3d(star_material.clone()),
        ChildOf(topper_entity),
    ));
    commands.spawn((
        Name::new("Topper Halo"),
        Mesh3d(halo_handle),
        MeshMaterial3d(halo_material.clone()),
        ChildOf(topper_entity),
    ));
    let light = commands
        .spawn((
            Name::new("Topper Light"),
            TopperLight,
            PointLight {
                color,
                intensity: consts::LIGHT_INTENSITY * state.progress,
                range: consts::LIGHT_RANGE,
                ..default()
            },
            ChildOf(topper_entity),
        ))
        .id();

    commands.entity(topper_entity).insert(TopperLook {
        star_material,
        halo_material,
        emissive,
        light,
    });
    topper_entity
}

/// Extruded star prism centered on the origin, facing +Z.
///
/// Front and back faces are triangle fans around the center; each outline
/// edge gets its own flat-shaded side quad.
pub fn star_mesh(points: usize, outer_radius: f32, inner_radius: f32, depth: f32) -> Mesh {
    let outline: Vec<Vec2> = (0..points * 2)
        .map(|i| {
            let angle = PI * 0.5 + i as f32 * PI / points as f32;
            let radius = if i % 2 == 0 { outer_radius } else { inner_radius };
            Vec2::from_angle(angle) * radius
        })
        .collect();
    let n = outline.len() as u32;
    let half = depth * 0.5;

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (z, normal) in [(half, Vec3::Z), (-half, Vec3::NEG_Z)] {
        let center = positions.len() as u32;
        positions.push([0.0, 0.0, z]);
        normals.push(normal.to_array());
        for p in &outline {
            positions.push([p.x, p.y, z]);
            normals.push(normal.to_array());
        }
        for i in 0..n {
            let a = center + 1 + i;
            let b = center + 1 + (i + 1) % n;
            if z > 0.0 {
                indices.extend_from_slice(&[center, a, b]);
            } else {
                indices.extend_from_slice(&[center, b, a]);
            }
        }
    }

    for i in 0..outline.len() {
        let a = outline[i];
        let b = outline[(i + 1) % outline.len()];
        let edge = b - a;
        let normal = Vec3::new(edge.y, -edge.x, 0.0).normalize_or_zero().to_array();

        let base = positions.len() as u32;
        // front a, front b, back b, back a
        positions.extend_from_slice(&[
            [a.x, a.y, half],
            [b.x, b.y, half],
            [b.x, b.y, -half],
            [a.x, a.y, -half],
        ]);
        normals.extend_from_slice(&[normal; 4]);
        indices.extend_from_slice(&[base + 3, base + 2, base + 1, base + 3, base + 1, base]);
    }

    let uvs = vec![[0.0f32, 0.0]; positions.len()];

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(indices))
}
