use bevy::prelude::*;
use bevy_morph_distribution::{Distribution, OrnamentKind};
use bevy_morph_field::MorphFieldMaterial;

use crate::config::TreeMorphConfig;
use crate::constants::ornament;
use crate::field::spawn_particle_field;
use crate::morph::MorphState;
use crate::ornaments::{spawn_ornament_group, OrnamentGroup};
use crate::topper::{spawn_topper, Topper};

/// Generate every endpoint once and spawn the fields, ornaments and topper.
pub(crate) fn spawn_tree_scene(
    mut commands: Commands,
    config: Res<TreeMorphConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut field_materials: ResMut<Assets<MorphFieldMaterial>>,
) {
    let distribution = config.distribution;
    let mut rng = Distribution::rng(config.seed);
    // Each component starts scattered and morphs toward the configured target
    let state = MorphState::new(config.start_assembled);
    let palette = &config.palette;

    let foliage = distribution.generate_field(config.counts.foliage, &mut rng);
    spawn_particle_field(
        &mut commands,
        &mut meshes,
        &mut field_materials,
        &foliage,
        MorphFieldMaterial::foliage(palette.foliage(), palette.foliage_accent())
            .with_size_scale(config.size_unit),
        state,
    );

    let twinkle = distribution.generate_field(config.counts.twinkle, &mut rng);
    spawn_particle_field(
        &mut commands,
        &mut meshes,
        &mut field_materials,
        &twinkle,
        MorphFieldMaterial::twinkle(palette.twinkle()).with_size_scale(config.size_unit),
        state,
    );

    let sphere = meshes.add(
        Sphere::new(1.0)
            .mesh()
            .uv(ornament::SPHERE_SECTORS, ornament::SPHERE_STACKS),
    );
    let cube = meshes.add(Cuboid::new(1.0, 1.0, 1.0));

    for group in &config.counts.ornaments {
        let color = group.color();
        let material = materials.add(StandardMaterial {
            base_color: color,
            metallic: ornament::METALLIC,
            perceptual_roughness: ornament::ROUGHNESS,
            emissive: color.to_linear() * ornament::EMISSIVE_FACTOR,
            ..default()
        });
        let mesh = match group.kind {
            OrnamentKind::Light => sphere.clone(),
            OrnamentKind::Heavy => cube.clone(),
        };
        let positions = distribution.generate_instances(group.count, group.kind, &mut rng);
        spawn_ornament_group(
            &mut commands,
            OrnamentGroup::new(group.kind, positions),
            mesh,
            material,
            state,
        );
    }

    let topper = Topper::new(
        distribution.scatter_point(&mut rng),
        Topper::apex(distribution.tree.height),
    );
    spawn_topper(
        &mut commands,
        &mut meshes,
        &mut materials,
        topper,
        palette.topper(),
        state,
    );

    info!(
        "Tree scene spawned: {} foliage, {} twinkle, {} ornaments in {} groups{}",
        foliage.len(),
        twinkle.len(),
        config.ornament_count(),
        config.counts.ornaments.len(),
        match config.seed {
            Some(seed) => format!(", seed {}", seed),
            None => String::new(),
        }
    );
}
