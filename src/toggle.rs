use bevy::prelude::*;

use crate::TreeMorphSystems;

/// The single global target every component morphs toward.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct MorphToggle {
    /// true = assembled tree, false = scattered cloud
    pub assembled: bool,
}

impl Default for MorphToggle {
    fn default() -> Self {
        Self { assembled: true }
    }
}

impl MorphToggle {
    pub fn new(assembled: bool) -> Self {
        Self { assembled }
    }

    /// Flip the target and return the new value.
    pub fn toggle(&mut self) -> bool {
        self.assembled = !self.assembled;
        self.assembled
    }

    /// Status readout for the current target
    pub fn status_label(&self) -> &'static str {
        if self.assembled {
            "CONVERGED"
        } else {
            "ETHEREAL SCATTER"
        }
    }

    /// Label for the control that flips the target
    pub fn action_label(&self) -> &'static str {
        if self.assembled {
            "Release Magic"
        } else {
            "Assemble Form"
        }
    }
}

/// Request to flip the morph target
#[derive(Message)]
pub struct ToggleMorph;

/// Key that flips the morph target
pub const TOGGLE_KEY: KeyCode = KeyCode::Space;

pub struct TogglePlugin;

impl Plugin for TogglePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<MorphToggle>()
            .init_resource::<MorphToggle>()
            .add_message::<ToggleMorph>()
            .add_systems(
                Update,
                (
                    toggle_on_key.run_if(resource_exists::<ButtonInput<KeyCode>>),
                    handle_toggle_morph,
                )
                    .chain()
                    .in_set(TreeMorphSystems::Input),
            );
    }
}

fn toggle_on_key(keyboard: Res<ButtonInput<KeyCode>>, mut events: MessageWriter<ToggleMorph>) {
    if keyboard.just_pressed(TOGGLE_KEY) {
        events.write(ToggleMorph);
    }
}

fn handle_toggle_morph(mut events: MessageReader<ToggleMorph>, mut toggle: ResMut<MorphToggle>) {
    for _ in events.read() {
        toggle.toggle();
        info!("Morph target: {}", toggle.status_label());
    }
}
