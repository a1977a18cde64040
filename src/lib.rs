//! # Bevy Tree Morph
//!
//! A particle and ornament tree that morphs between a scattered cloud and an
//! assembled cone silhouette.
//!
//! ## Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_tree_morph::TreeMorphPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TreeMorphPlugin)
//!         .run();
//! }
//! ```
//!
//! Flip the target with `Space`, or write a [`ToggleMorph`] message from your
//! own UI. Every component eases toward the new target on its own
//! [`MorphState`], so a reversal mid-transition simply turns around.
//!
//! ## Layout
//!
//! - Bulk particles (foliage, twinkle lights) are GPU-evaluated fields from
//!   `bevy_morph_field`; the host only writes time, progress and size scale.
//! - Ornaments are instanced groups whose transforms are evaluated on the host
//!   each frame and uploaded once per group.
//! - The topper is a single star with hover, spin, pulse and glow.
//!
//! Scene sizes, counts, colors and the optional RNG seed come from
//! [`TreeMorphConfig`], loaded from `config_dir/bevy_tree_morph/config.ron`.

pub mod config;
pub mod constants;
pub mod field;
pub mod morph;
pub mod ornaments;
mod scene;
pub mod toggle;
pub mod topper;

use bevy::prelude::*;
use bevy_morph_field::MorphFieldPlugin;

pub use config::TreeMorphConfig;
pub use field::{FieldPlugin, ParticleField};
pub use morph::{MorphPlugin, MorphState};
pub use ornaments::{
    evaluate_instance, FloatMotion, InstanceSlot, InstanceTransforms, OrnamentGroup,
    OrnamentsPlugin,
};
pub use toggle::{MorphToggle, TogglePlugin, ToggleMorph};
pub use topper::{Topper, TopperPlugin};

/// Per-frame stages, chained in this order within `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeMorphSystems {
    /// Toggle requests become the global target
    Input,
    /// Every [`MorphState`] steps toward the target
    Advance,
    /// Host-side transforms are evaluated
    Evaluate,
    /// Results are pushed to render entities and materials
    Upload,
}

/// Loads the config, spawns the tree and drives it every frame.
pub struct TreeMorphPlugin;

impl Plugin for TreeMorphPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<TreeMorphConfig>() {
            app.insert_resource(TreeMorphConfig::load());
        }
        let start_assembled = app.world().resource::<TreeMorphConfig>().start_assembled;

        app.insert_resource(MorphToggle::new(start_assembled))
            .add_plugins(MorphFieldPlugin)
            .add_plugins(MorphPlugin)
            .add_plugins(TogglePlugin)
            .add_plugins(OrnamentsPlugin)
            .add_plugins(TopperPlugin)
            .add_plugins(FieldPlugin)
            .add_systems(Startup, scene::spawn_tree_scene);
    }
}

pub mod prelude {
    pub use crate::{
        FloatMotion, MorphState, MorphToggle, ParticleField, ToggleMorph, Topper,
        TreeMorphConfig, TreeMorphPlugin, TreeMorphSystems,
    };
    pub use bevy_morph_distribution::prelude::*;
    pub use bevy_morph_field::{FieldStyle, MorphFieldMaterial};
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_morph_distribution::{Distribution, OrnamentKind};
    use std::time::Duration;

    /// Toggle, advance, evaluate and upload run in one frame, in order.
    #[test]
    fn toggle_reaches_instances_in_the_same_frame() {
        let mut app = App::new();
        app.init_resource::<Time>()
            .insert_resource(MorphToggle::new(false))
            .add_plugins((MorphPlugin, TogglePlugin, OrnamentsPlugin));

        let positions = Distribution::default().generate_instances(
            4,
            OrnamentKind::Heavy,
            &mut Distribution::rng(Some(3)),
        );
        let group = app
            .world_mut()
            .spawn((
                OrnamentGroup::new(OrnamentKind::Heavy, positions.clone()),
                MorphState::settled(false),
            ))
            .id();
        let slot = app
            .world_mut()
            .spawn((InstanceSlot { group, index: 0 }, Transform::default()))
            .id();

        app.world_mut().write_message(ToggleMorph);
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_secs_f32(1.0));
        app.update();

        let state = app.world().get::<MorphState>(group).unwrap();
        assert!(state.target);
        assert_eq!(state.progress, 1.0);

        let transform = app.world().get::<Transform>(slot).unwrap();
        assert!(transform.translation.distance(positions[0].assembled_position) < 1e-5);
    }
}
