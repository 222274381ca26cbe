//! Input abstraction layer.
//!
//! Normalizes host pointer, wheel, and keyboard events into a single
//! `InputEvent` enum consumed by the canvas controller. Coordinates are
//! always screen pixels relative to the canvas surface.

use nc_core::ScreenPoint;

/// Which pointer button went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left mouse button, touch contact, or pen tip.
    #[default]
    Primary,
    Middle,
    /// Right mouse button.
    Secondary,
}

impl PointerButton {
    /// Map a DOM `PointerEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Whether a node press should toggle multi-selection.
    pub fn toggles_selection(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }

    /// Platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// The host lost the pointer (`pointercancel`, lost capture, window blur).
    PointerCancel,
    DoubleClick {
        x: f64,
        y: f64,
    },
    /// Wheel or trackpad scroll. Negative `delta_y` zooms in.
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
    },
    Key {
        /// `KeyboardEvent.key` value (e.g. `"Escape"`, `"+"`).
        key: String,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Primary-button press with no modifiers.
    pub fn press(x: f64, y: f64) -> Self {
        Self::PointerDown {
            x,
            y,
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Extract position if this is a positional event.
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y }
            | Self::PointerUp { x, y }
            | Self::DoubleClick { x, y }
            | Self::Wheel { x, y, .. } => Some(ScreenPoint::new(*x, *y)),
            Self::PointerCancel | Self::Key { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dom_buttons_map_to_pointer_buttons() {
        assert_eq!(PointerButton::from_dom(0), PointerButton::Primary);
        assert_eq!(PointerButton::from_dom(1), PointerButton::Middle);
        assert_eq!(PointerButton::from_dom(2), PointerButton::Secondary);
        assert_eq!(PointerButton::from_dom(4), PointerButton::Primary);
    }

    #[test]
    fn alt_alone_does_not_toggle_selection() {
        let alt = Modifiers {
            alt: true,
            ..Modifiers::NONE
        };
        assert!(!alt.toggles_selection());
        assert!(Modifiers::SHIFT.toggles_selection());
    }

    #[test]
    fn position_only_for_positional_events() {
        assert_eq!(InputEvent::press(3.0, 4.0).position(), Some(ScreenPoint::new(3.0, 4.0)));
        assert_eq!(InputEvent::PointerCancel.position(), None);
        assert_eq!(InputEvent::key("Escape").position(), None);
    }
}
