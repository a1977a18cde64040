//! Demo binary: the morphing tree with an orbiting camera and a toggle overlay.

use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::post_process::bloom::Bloom;
use bevy::prelude::*;
use bevy::render::view::Hdr;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use bevy_tree_morph::constants::palette;
use bevy_tree_morph::{MorphToggle, ToggleMorph, TreeMorphConfig, TreeMorphPlugin};

/// Orbit speed while the tree is formed, rad/s
const ORBIT_SPEED: f32 = 0.03;
const CAMERA_DISTANCE: f32 = 35.0;
const CAMERA_FOV_DEGREES: f32 = 40.0;
const OVERLAY_PADDING: f32 = 32.0;

#[derive(Component)]
struct OrbitCamera;

fn main() {
    let config = TreeMorphConfig::load();
    // Seed an editable config on first run
    if let Some(path) = TreeMorphConfig::file_path() {
        if !path.exists() {
            config.save();
        }
    }

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Tree Morph".to_string(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(palette::BACKGROUND))
        .insert_resource(config)
        .add_plugins(EguiPlugin::default())
        .add_plugins(TreeMorphPlugin)
        .add_systems(Startup, setup_view)
        .add_systems(Update, orbit_camera)
        .add_systems(EguiPrimaryContextPass, draw_overlay)
        .run();
}

fn setup_view(mut commands: Commands) {
    commands.spawn((
        OrbitCamera,
        Camera3d::default(),
        Hdr,
        Tonemapping::AcesFitted,
        Bloom::NATURAL,
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn(AmbientLight {
        color: Color::WHITE,
        brightness: 80.0,
        affects_lightmapped_meshes: true,
    });
    commands.spawn((
        Name::new("Key Light"),
        PointLight {
            color: palette::GOLD,
            intensity: 2_000_000.0,
            range: 60.0,
            ..default()
        },
        Transform::from_xyz(10.0, 20.0, 10.0),
    ));
    commands.spawn((
        Name::new("Fill Light"),
        PointLight {
            color: Color::srgb(0.75, 0.85, 1.0),
            intensity: 400_000.0,
            range: 40.0,
            ..default()
        },
        Transform::from_xyz(-10.0, -10.0, -10.0),
    ));
}

/// Slowly circle the tree while it is formed
fn orbit_camera(
    time: Res<Time>,
    toggle: Res<MorphToggle>,
    mut cameras: Query<&mut Transform, With<OrbitCamera>>,
) {
    if !toggle.assembled {
        return;
    }
    for mut transform in &mut cameras {
        transform.rotate_around(
            Vec3::ZERO,
            Quat::from_rotation_y(ORBIT_SPEED * time.delta_secs()),
        );
    }
}

fn draw_overlay(
    mut contexts: EguiContexts,
    toggle: Res<MorphToggle>,
    mut events: MessageWriter<ToggleMorph>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let gold = egui::Color32::from_rgb(255, 215, 0);

    egui::Area::new(egui::Id::new("tree_morph_title"))
        .anchor(egui::Align2::LEFT_TOP, [OVERLAY_PADDING, OVERLAY_PADDING])
        .show(ctx, |ui| {
            ui.label(egui::RichText::new("Merry Christmas").size(36.0).color(gold));
            ui.label(
                egui::RichText::new("Space to toggle")
                    .small()
                    .color(egui::Color32::from_gray(160)),
            );
        });

    egui::Area::new(egui::Id::new("tree_morph_controls"))
        .anchor(
            egui::Align2::RIGHT_BOTTOM,
            [-OVERLAY_PADDING, -OVERLAY_PADDING],
        )
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new(format!("STATUS: {}", toggle.status_label()))
                    .monospace()
                    .color(gold),
            );
            let button = egui::Button::new(
                egui::RichText::new(toggle.action_label())
                    .size(20.0)
                    .color(gold),
            );
            if ui.add(button).clicked() {
                events.write(ToggleMorph);
            }
        });

    Ok(())
}
