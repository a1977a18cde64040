//! Host side of the particle fields: spawn once, then three scalars per frame.

use bevy::camera::visibility::NoFrustumCulling;
use bevy::prelude::*;
use bevy_morph_distribution::FieldData;
use bevy_morph_field::{create_field_mesh, MorphFieldMaterial};

use crate::config::TreeMorphConfig;
use crate::morph::{MorphPlugin, MorphState};
use crate::TreeMorphSystems;

/// A GPU-evaluated particle field of `count` particles.
///
/// Fields with no particles are never touched by the per-frame update.
#[derive(Component, Clone, Copy, Debug)]
#[require(MorphState)]
pub struct ParticleField {
    pub count: usize,
}

pub struct FieldPlugin;

impl Plugin for FieldPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<MorphPlugin>() {
            app.add_plugins(MorphPlugin);
        }
        app.add_systems(
            Update,
            update_field_parameters
                .in_set(TreeMorphSystems::Upload)
                .run_if(resource_exists::<Assets<MorphFieldMaterial>>),
        );
    }
}

fn update_field_parameters(
    time: Res<Time>,
    config: Res<TreeMorphConfig>,
    fields: Query<(&ParticleField, &MorphState, &MeshMaterial3d<MorphFieldMaterial>)>,
    mut materials: ResMut<Assets<MorphFieldMaterial>>,
) {
    // Quads are sized in world units, so the display scale factor stays out of it
    let scale = config.size_unit;
    let elapsed = time.elapsed_secs();

    for (field, state, material) in &fields {
        if field.count == 0 {
            continue;
        }
        // Material not loaded yet; try again next frame
        let Some(material) = materials.get_mut(&material.0) else {
            continue;
        };
        material.set_frame(elapsed, state.progress, scale);
    }
}

/// Spawn one particle field from generated buffers.
pub fn spawn_particle_field(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<MorphFieldMaterial>,
    data: &FieldData,
    material: MorphFieldMaterial,
    state: MorphState,
) -> Entity {
    let style = material.style();
    commands
        .spawn((
            Name::new(format!("{} Field", style.label())),
            ParticleField { count: data.len() },
            state,
            Mesh3d(meshes.add(create_field_mesh(data))),
            MeshMaterial3d(materials.add(material)),
            Transform::default(),
            // Bounds only cover the scattered endpoints
            NoFrustumCulling,
        ))
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toggle::MorphToggle;
    use bevy::window::PrimaryWindow;
    use bevy_morph_field::FieldStyle;
    use std::time::Duration;

    fn field_app() -> App {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(MorphToggle::new(true))
            .insert_resource(Assets::<MorphFieldMaterial>::default())
            .add_plugins(FieldPlugin);
        app
    }

    fn add_material(app: &mut App, style: FieldStyle) -> Handle<MorphFieldMaterial> {
        app.world_mut()
            .resource_mut::<Assets<MorphFieldMaterial>>()
            .add(MorphFieldMaterial::new(style))
    }

    #[test]
    fn material_receives_frame_parameters() {
        let mut app = field_app();
        let handle = add_material(&mut app, FieldStyle::Twinkle);
        app.world_mut().spawn((
            ParticleField { count: 1 },
            MorphState::new(false),
            MeshMaterial3d(handle.clone()),
        ));

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(0.1));
        app.update();

        let materials = app.world().resource::<Assets<MorphFieldMaterial>>();
        let material = materials.get(&handle).unwrap();
        let config = TreeMorphConfig::default();
        assert!((material.uniform.progress - 0.15).abs() < 1e-5);
        assert!((material.uniform.time - 0.1).abs() < 1e-5);
        assert_eq!(material.uniform.size_scale, config.size_unit);
    }

    #[test]
    fn hidpi_window_does_not_change_particle_size() {
        let mut app = field_app();
        let mut window = Window::default();
        window.resolution.set_scale_factor_override(Some(2.0));
        app.world_mut().spawn((window, PrimaryWindow));

        let handle = add_material(&mut app, FieldStyle::Foliage);
        app.world_mut().spawn((
            ParticleField { count: 1 },
            MeshMaterial3d(handle.clone()),
        ));
        app.update();

        let materials = app.world().resource::<Assets<MorphFieldMaterial>>();
        let material = materials.get(&handle).unwrap();
        assert_eq!(
            material.uniform.size_scale,
            TreeMorphConfig::default().size_unit
        );
    }

    #[test]
    fn empty_field_is_left_untouched() {
        let mut app = field_app();
        let handle = add_material(&mut app, FieldStyle::Foliage);
        app.world_mut().spawn((
            ParticleField { count: 0 },
            MorphState::new(false),
            MeshMaterial3d(handle.clone()),
        ));

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(0.1));
        app.update();

        let materials = app.world().resource::<Assets<MorphFieldMaterial>>();
        let material = materials.get(&handle).unwrap();
        assert_eq!(material.uniform.progress, 0.0);
        assert_eq!(material.uniform.time, 0.0);
    }

    #[test]
    fn missing_material_is_skipped() {
        let mut app = field_app();
        app.world_mut().spawn((
            ParticleField { count: 1 },
            MeshMaterial3d::<MorphFieldMaterial>(Handle::default()),
        ));
        app.update();
    }
}
