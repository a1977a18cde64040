//! Per-component morph progress and its frame-rate independent advance.

use bevy::prelude::*;

use crate::config::TreeMorphConfig;
use crate::toggle::MorphToggle;
use crate::TreeMorphSystems;

/// Approach rate used when no config overrides it, per second.
pub const DEFAULT_MORPH_RATE: f32 = 1.5;

/// Where one animated component sits between its two configurations.
///
/// `progress` is 0 when fully scattered and 1 when fully assembled. Every
/// ornament group, the topper and each particle field owns one, so
/// components may lag each other while a transition is under way.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Reflect)]
#[reflect(Component, Default)]
pub struct MorphState {
    /// true = assembled
    pub target: bool,
    pub progress: f32,
}

impl MorphState {
    pub fn new(target: bool) -> Self {
        Self {
            target,
            progress: 0.0,
        }
    }

    /// Start already settled at the target endpoint.
    pub fn settled(target: bool) -> Self {
        Self {
            target,
            progress: Self::endpoint(target),
        }
    }

    fn endpoint(target: bool) -> f32 {
        if target { 1.0 } else { 0.0 }
    }

    /// Advance toward `target` by one frame of exponential approach.
    ///
    /// The blend factor `rate * delta_secs` is clamped to `[0, 1]`, so a
    /// long stall lands exactly on the target and never overshoots.
    pub fn advance(self, target: bool, delta_secs: f32, rate: f32) -> Self {
        let goal = Self::endpoint(target);
        let alpha = (rate * delta_secs).clamp(0.0, 1.0);
        let progress = self.progress + (goal - self.progress) * alpha;
        Self {
            target,
            progress: progress.clamp(0.0, 1.0),
        }
    }

    pub fn step(&mut self, target: bool, delta_secs: f32, rate: f32) {
        *self = self.advance(target, delta_secs, rate);
    }

    /// Progress sits exactly on the target endpoint.
    pub fn is_settled(&self) -> bool {
        self.progress == Self::endpoint(self.target)
    }
}

pub struct MorphPlugin;

impl Plugin for MorphPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<MorphState>()
            .init_resource::<TreeMorphConfig>()
            .init_resource::<MorphToggle>()
            .configure_sets(
                Update,
                (
                    TreeMorphSystems::Input,
                    TreeMorphSystems::Advance,
                    TreeMorphSystems::Evaluate,
                    TreeMorphSystems::Upload,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                advance_morph_states.in_set(TreeMorphSystems::Advance),
            );
    }
}

/// Pull the global target into every component and advance its progress.
fn advance_morph_states(
    time: Res<Time>,
    toggle: Res<MorphToggle>,
    config: Res<TreeMorphConfig>,
    mut states: Query<(Entity, &mut MorphState)>,
) {
    let dt = time.delta_secs();
    for (entity, mut state) in &mut states {
        let was_settled = state.is_settled() && state.target == toggle.assembled;
        state.step(toggle.assembled, dt, config.morph_rate);
        if !was_settled && state.is_settled() {
            debug!("{:?} settled at progress {}", entity, state.progress);
        }
    }
}
