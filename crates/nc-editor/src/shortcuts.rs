//! Keyboard shortcut mapping.
//!
//! Maps `KeyboardEvent.key` plus modifiers to semantic [`ShortcutAction`]s.
//! The map lives in Rust so the WASM host and native tests resolve keys the
//! same way.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Abandon the gesture in flight.
    Cancel,
    ZoomIn,
    ZoomOut,
    /// Back to 100 %.
    ResetZoom,
    /// Delete the active edge.
    DeleteEdge,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action. Returns `None` if the combo has no
    /// binding. Zoom keys work with or without the command key so browser
    /// muscle memory (⌘+ / ⌘−) still applies.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.alt {
            return None;
        }
        match key {
            "Escape" => Some(ShortcutAction::Cancel),
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" | "_" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ResetZoom),
            "Delete" | "Backspace" if !modifiers.command() => Some(ShortcutAction::DeleteEdge),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_keys() {
        let none = Modifiers::NONE;
        assert_eq!(ShortcutMap::resolve("Escape", none), Some(ShortcutAction::Cancel));
        assert_eq!(ShortcutMap::resolve("=", none), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("-", none), Some(ShortcutAction::ZoomOut));
        assert_eq!(ShortcutMap::resolve("0", none), Some(ShortcutAction::ResetZoom));
        assert_eq!(ShortcutMap::resolve("Backspace", none), Some(ShortcutAction::DeleteEdge));
        assert_eq!(ShortcutMap::resolve("q", none), None);
    }

    #[test]
    fn command_zoom_still_resolves() {
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("+", cmd), Some(ShortcutAction::ZoomIn));
        assert_eq!(ShortcutMap::resolve("0", cmd), Some(ShortcutAction::ResetZoom));
    }

    #[test]
    fn command_delete_and_alt_combos_are_unbound() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        };
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Delete", ctrl), None);
        assert_eq!(ShortcutMap::resolve("Escape", alt), None);
    }
}
