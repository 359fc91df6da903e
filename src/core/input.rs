//! Keyboard input mapping
//!
//! Translates key presses into [`SceneCommand`]s. The window loop never
//! mutates scene state directly; it forwards the resulting command to the
//! scene, which owns all toggles.

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// State changes a scene can receive from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneCommand {
    /// T: next shading mode (0..5, wraps)
    CycleShadingMode,
    /// M: next metallic preset
    CycleMetallic,
    /// R: next roughness preset
    CycleRoughness,
    /// A: next ambient occlusion preset
    CycleAmbientOcclusion,
    /// P: pause or resume the model rotation
    TogglePause,
    /// G: next geometry (cube, sphere, imported model)
    CycleGeometry,
    /// F: pin the light in front of the camera or let it orbit
    TogglePinnedLight,
}

/// Map a physical key to a command
pub fn map_key(key: KeyCode) -> Option<SceneCommand> {
    match key {
        KeyCode::KeyT => Some(SceneCommand::CycleShadingMode),
        KeyCode::KeyM => Some(SceneCommand::CycleMetallic),
        KeyCode::KeyR => Some(SceneCommand::CycleRoughness),
        KeyCode::KeyA => Some(SceneCommand::CycleAmbientOcclusion),
        KeyCode::KeyP => Some(SceneCommand::TogglePause),
        KeyCode::KeyG => Some(SceneCommand::CycleGeometry),
        KeyCode::KeyF => Some(SceneCommand::TogglePinnedLight),
        _ => None,
    }
}

/// Map a raw key transition
///
/// Only fresh presses count; releases and auto-repeat are ignored so holding
/// a key toggles once.
pub fn map_key_transition(key: PhysicalKey, state: ElementState, repeat: bool) -> Option<SceneCommand> {
    if state != ElementState::Pressed || repeat {
        return None;
    }
    match key {
        PhysicalKey::Code(code) => map_key(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

/// Map a winit keyboard event
pub fn map_key_event(event: &KeyEvent) -> Option<SceneCommand> {
    map_key_transition(event.physical_key, event.state, event.repeat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_toggle_keys_are_mapped() {
        let keys = [
            (KeyCode::KeyT, SceneCommand::CycleShadingMode),
            (KeyCode::KeyM, SceneCommand::CycleMetallic),
            (KeyCode::KeyR, SceneCommand::CycleRoughness),
            (KeyCode::KeyA, SceneCommand::CycleAmbientOcclusion),
            (KeyCode::KeyP, SceneCommand::TogglePause),
            (KeyCode::KeyG, SceneCommand::CycleGeometry),
            (KeyCode::KeyF, SceneCommand::TogglePinnedLight),
        ];
        for (key, command) in keys {
            assert_eq!(map_key(key), Some(command));
        }
    }

    #[test]
    fn test_unmapped_keys() {
        assert_eq!(map_key(KeyCode::KeyW), None);
        assert_eq!(map_key(KeyCode::Escape), None);
    }

    #[test]
    fn test_only_fresh_presses_produce_commands() {
        let key = PhysicalKey::Code(KeyCode::KeyP);
        assert_eq!(
            map_key_transition(key, ElementState::Pressed, false),
            Some(SceneCommand::TogglePause)
        );
        assert_eq!(map_key_transition(key, ElementState::Pressed, true), None);
        assert_eq!(map_key_transition(key, ElementState::Released, false), None);
    }
}
