//! Instanced ornament groups: per-frame transform evaluation and upload.

use bevy::prelude::*;
use bevy_morph_distribution::{DualPosition, OrnamentKind};

use crate::morph::{MorphPlugin, MorphState};
use crate::TreeMorphSystems;

/// Angular speed of the tumble applied while scattered, rad/s.
pub const SPIN_RATE: f32 = 0.5;

/// Vertical bob applied to the scattered endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct FloatMotion {
    /// Angular speed of the bob, rad/s
    pub speed: f32,
    /// Peak offset in world units
    pub amplitude: f32,
}

impl FloatMotion {
    pub const LIGHT: Self = Self {
        speed: 1.2,
        amplitude: 0.5,
    };
    pub const HEAVY: Self = Self {
        speed: 0.5,
        amplitude: 0.2,
    };
    pub const TOPPER: Self = Self {
        speed: 1.0,
        amplitude: 0.3,
    };

    pub fn for_kind(kind: OrnamentKind) -> Self {
        match kind {
            OrnamentKind::Light => Self::LIGHT,
            OrnamentKind::Heavy => Self::HEAVY,
        }
    }

    /// `sin(t·speed + phase)·amplitude·(1 − p)`: fades out as the tree forms.
    pub fn offset(&self, elapsed: f32, phase: f32, progress: f32) -> f32 {
        (elapsed * self.speed + phase).sin() * self.amplitude * (1.0 - progress)
    }
}

/// Transform of one instance at time `elapsed` and morph `progress`.
///
/// Fully assembled, the result is exactly the assembled endpoint with the
/// seed rotation; scattered, the instance bobs and tumbles about its
/// scattered endpoint.
pub fn evaluate_instance(
    position: &DualPosition,
    index: usize,
    elapsed: f32,
    progress: f32,
    motion: FloatMotion,
) -> Transform {
    let scatter = position.scatter_position
        + Vec3::Y * motion.offset(elapsed, index as f32, progress);
    let translation = scatter.lerp(position.assembled_position, progress);

    let tumble = elapsed * (1.0 - progress) * SPIN_RATE;
    let seed = position.rotation_seed;
    let rotation = Quat::from_euler(EulerRot::XYZ, seed.x + tumble, seed.y + tumble, seed.z);

    Transform {
        translation,
        rotation,
        scale: Vec3::splat(position.scale),
    }
}

/// A batch of same-kind ornaments rendered from one instanced buffer.
#[derive(Component, Clone, Debug)]
#[require(MorphState, InstanceTransforms)]
pub struct OrnamentGroup {
    pub kind: OrnamentKind,
    pub positions: Vec<DualPosition>,
    pub motion: FloatMotion,
}

impl OrnamentGroup {
    pub fn new(kind: OrnamentKind, positions: Vec<DualPosition>) -> Self {
        Self {
            kind,
            positions,
            motion: FloatMotion::for_kind(kind),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Instanced transform buffer: one slot per instance plus a dirty flag.
///
/// The evaluator writes every slot and then marks the buffer dirty once; the
/// upload stage copies each slot to the [`InstanceSlot`] entity with the
/// matching index and clears the flag once every slot has landed.
#[derive(Component, Clone, Debug, Default)]
pub struct InstanceTransforms {
    slots: Vec<Transform>,
    dirty: bool,
    uploaded: usize,
}

impl InstanceTransforms {
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![Transform::IDENTITY; len],
            dirty: false,
            uploaded: 0,
        }
    }

    /// Grow or shrink to `len` slots; new slots start at identity.
    pub fn resize(&mut self, len: usize) {
        self.slots.resize(len, Transform::IDENTITY);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Write one slot. Out-of-range slots are ignored.
    pub fn write(&mut self, slot: usize, transform: Transform) {
        if let Some(dst) = self.slots.get_mut(slot) {
            *dst = transform;
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Transform> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> &[Transform] {
        &self.slots
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Render entity driven by slot `index` of the buffer on `group`.
#[derive(Component, Clone, Copy, Debug)]
pub struct InstanceSlot {
    pub group: Entity,
    pub index: usize,
}

pub struct OrnamentsPlugin;

impl Plugin for OrnamentsPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<MorphPlugin>() {
            app.add_plugins(MorphPlugin);
        }
        app.add_systems(
            Update,
            (
                evaluate_ornament_groups.in_set(TreeMorphSystems::Evaluate),
                upload_instance_transforms.in_set(TreeMorphSystems::Upload),
            ),
        );
    }
}

fn evaluate_ornament_groups(
    time: Res<Time>,
    mut groups: Query<(&OrnamentGroup, &MorphState, &mut InstanceTransforms)>,
) {
    let elapsed = time.elapsed_secs();
    for (group, state, mut buffer) in &mut groups {
        if buffer.len() != group.len() {
            buffer.resize(group.len());
        }
        for (i, position) in group.positions.iter().enumerate() {
            buffer.write(
                i,
                evaluate_instance(position, i, elapsed, state.progress, group.motion),
            );
        }
        buffer.mark_dirty();
    }
}

fn upload_instance_transforms(
    mut groups: Query<&mut InstanceTransforms>,
    mut slots: Query<(&InstanceSlot, &mut Transform)>,
) {
    for (slot, mut transform) in &mut slots {
        let Ok(mut buffer) = groups.get_mut(slot.group) else {
            continue;
        };
        if !buffer.dirty {
            continue;
        }
        let Some(src) = buffer.slots.get(slot.index).copied() else {
            continue;
        };
        *transform = src;
        buffer.uploaded += 1;
    }

    for mut buffer in &mut groups {
        // Slots whose render entity is not spawned yet keep the buffer dirty
        if buffer.dirty && buffer.uploaded >= buffer.slots.len() {
            buffer.dirty = false;
        }
        buffer.uploaded = 0;
    }
}

/// Spawn an ornament group and one render entity per instance.
///
/// The group entity owns the buffer and the [`MorphState`]; each instance is
/// a child sharing `mesh` and `material`, so they batch into one draw.
pub fn spawn_ornament_group(
    commands: &mut Commands,
    group: OrnamentGroup,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    state: MorphState,
) -> Entity {
    let len = group.len();
    let name = format!("{} Ornaments", group.kind.label());
    let group_entity = commands
        .spawn((
            Name::new(name),
            state,
            Transform::default(),
            Visibility::default(),
        ))
        .id();

    for index in 0..len {
        commands.spawn((
            InstanceSlot {
                group: group_entity,
                index,
            },
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_scale(Vec3::ZERO),
            ChildOf(group_entity),
        ));
    }

    commands
        .entity(group_entity)
        .insert((group, InstanceTransforms::new(len)));
    group_entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::MorphToggle;
    use std::f32::consts::PI;
    use std::time::Duration;

    fn sample_position() -> DualPosition {
        DualPosition {
            scatter_position: Vec3::new(1.0, 2.0, 3.0),
            assembled_position: Vec3::new(4.0, 5.0, 6.0),
            rotation_seed: Vec3::new(0.5, 1.0, 0.0),
            scale: 0.2,
        }
    }

    #[test]
    fn assembled_instance_matches_endpoint() {
        let t = evaluate_instance(&sample_position(), 3, 10.0, 1.0, FloatMotion::LIGHT);
        assert!(t.translation.distance(Vec3::new(4.0, 5.0, 6.0)) < 1e-5);
        assert_eq!(t.scale, Vec3::splat(0.2));

        let expected = Quat::from_euler(EulerRot::XYZ, 0.5, 1.0, 0.0);
        assert!(t.rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn scattered_instance_bobs_around_scatter_endpoint() {
        let position = sample_position();
        let motion = FloatMotion::LIGHT;
        for step in 0..100 {
            let elapsed = step as f32 * 0.1;
            let t = evaluate_instance(&position, 7, elapsed, 0.0, motion);
            assert_eq!(t.translation.x, 1.0);
            assert_eq!(t.translation.z, 3.0);
            assert!((t.translation.y - 2.0).abs() <= motion.amplitude + 1e-5);
        }
    }

    #[test]
    fn scattered_instance_tumbles() {
        let position = sample_position();
        let a = evaluate_instance(&position, 0, 0.0, 0.0, FloatMotion::HEAVY);
        let b = evaluate_instance(&position, 0, PI, 0.0, FloatMotion::HEAVY);
        assert!(a.rotation.angle_between(b.rotation) > 0.1);
    }

    #[test]
    fn float_offset_fades_with_progress() {
        let motion = FloatMotion::HEAVY;
        let full = motion.offset(1.0, 0.0, 0.0);
        let half = motion.offset(1.0, 0.0, 0.5);
        assert!((half - full * 0.5).abs() < 1e-6);
        assert_eq!(motion.offset(1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn buffer_ignores_out_of_range_writes() {
        let mut buffer = InstanceTransforms::new(2);
        buffer.write(5, Transform::from_xyz(1.0, 0.0, 0.0));
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.get(0), Some(&Transform::IDENTITY));
        assert!(buffer.get(5).is_none());
    }

    fn headless_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(MorphToggle::new(true))
            .add_plugins(OrnamentsPlugin);
        app
    }

    /// Spawn a bare group plus one slot entity per position; returns the
    /// group and its slot entities in index order.
    fn spawn_group(
        app: &mut App,
        positions: Vec<DualPosition>,
        state: MorphState,
    ) -> (Entity, Vec<Entity>) {
        let world = app.world_mut();
        let len = positions.len();
        let group = world
            .spawn((OrnamentGroup::new(OrnamentKind::Light, positions), state))
            .id();
        let slots = (0..len)
            .map(|index| {
                world
                    .spawn((InstanceSlot { group, index }, Transform::default()))
                    .id()
            })
            .collect();
        (group, slots)
    }

    fn advance_frame(app: &mut App, secs: f32) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(secs));
        app.update();
    }

    #[test]
    fn evaluation_fills_every_slot_then_marks_dirty() {
        use bevy::ecs::system::RunSystemOnce;

        let mut world = World::new();
        world.init_resource::<Time>();
        let position = sample_position();
        let group = world
            .spawn((
                OrnamentGroup::new(OrnamentKind::Heavy, vec![position; 3]),
                MorphState::settled(true),
                InstanceTransforms::new(3),
            ))
            .id();

        world.run_system_once(evaluate_ornament_groups).unwrap();

        let buffer = world.get::<InstanceTransforms>(group).unwrap();
        assert!(buffer.is_dirty());
        for slot in buffer.slots() {
            assert!(slot.translation.distance(position.assembled_position) < 1e-5);
        }
    }

    #[test]
    fn evaluate_then_upload_reaches_slot_entities() {
        let mut app = headless_app();
        let position = sample_position();
        let (group, slots) = spawn_group(&mut app, vec![position], MorphState::settled(true));

        advance_frame(&mut app, 0.016);

        let buffer = app.world().get::<InstanceTransforms>(group).unwrap();
        assert!(!buffer.is_dirty());
        let t = app.world().get::<Transform>(slots[0]).unwrap();
        assert!(t.translation.distance(position.assembled_position) < 1e-5);
    }

    #[test]
    fn upload_follows_slot_index_not_spawn_order() {
        let mut app = headless_app();
        let near = sample_position();
        let far = DualPosition {
            assembled_position: Vec3::new(-4.0, -5.0, -6.0),
            ..near
        };
        let world = app.world_mut();
        let group = world
            .spawn((
                OrnamentGroup::new(OrnamentKind::Heavy, vec![near, far]),
                MorphState::settled(true),
            ))
            .id();
        // Spawned in reverse so entity order disagrees with slot order
        let second = world
            .spawn((InstanceSlot { group, index: 1 }, Transform::default()))
            .id();
        let first = world
            .spawn((InstanceSlot { group, index: 0 }, Transform::default()))
            .id();

        advance_frame(&mut app, 0.016);

        let world = app.world();
        let t0 = world.get::<Transform>(first).unwrap();
        let t1 = world.get::<Transform>(second).unwrap();
        assert!(t0.translation.distance(near.assembled_position) < 1e-5);
        assert!(t1.translation.distance(far.assembled_position) < 1e-5);
    }

    #[test]
    fn bare_spawned_group_sizes_its_buffer() {
        let mut app = headless_app();
        let (group, slots) = spawn_group(
            &mut app,
            vec![sample_position(); 3],
            MorphState::settled(true),
        );
        assert_eq!(app.world().get::<InstanceTransforms>(group).unwrap().len(), 0);

        advance_frame(&mut app, 0.016);

        let buffer = app.world().get::<InstanceTransforms>(group).unwrap();
        assert_eq!(buffer.len(), 3);
        assert!(!buffer.is_dirty());
        let t = app.world().get::<Transform>(slots[2]).unwrap();
        assert!(t.translation.distance(sample_position().assembled_position) < 1e-5);
    }

    #[test]
    fn missing_slot_entity_keeps_buffer_dirty() {
        let mut app = headless_app();
        let (group, slots) = spawn_group(
            &mut app,
            vec![sample_position(), sample_position()],
            MorphState::settled(true),
        );
        app.world_mut().despawn(slots[1]);

        advance_frame(&mut app, 0.016);
        assert!(app.world().get::<InstanceTransforms>(group).unwrap().is_dirty());

        // Once the render entity exists the retry lands and clears the flag
        app.world_mut()
            .spawn((InstanceSlot { group, index: 1 }, Transform::default()));
        advance_frame(&mut app, 0.016);
        assert!(!app.world().get::<InstanceTransforms>(group).unwrap().is_dirty());
    }

    #[test]
    fn empty_group_is_harmless() {
        let mut app = headless_app();
        let (group, _) = spawn_group(&mut app, Vec::new(), MorphState::new(true));
        advance_frame(&mut app, 0.016);
        let buffer = app.world().get::<InstanceTransforms>(group).unwrap();
        assert!(buffer.is_empty());
        assert!(!buffer.is_dirty());
    }
}
