//! Raw input event types shared between the surface and lower layers.
//!
//! The stream view forwards these unmodified; gesture interpretation
//! happens below the UI layer, so the types here stay deliberately
//! close to what the platform reports.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ── Touch ────────────────────────────────────────────────────────

/// Lifecycle phase of one touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

impl TouchPhase {
    /// Whether this phase removes the contact from the surface.
    pub const fn is_terminal(self) -> bool {
        matches!(self, TouchPhase::Ended | TouchPhase::Cancelled)
    }
}

/// One raw touch event in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Stable identifier for the contact across its phases.
    pub id: u64,
    pub phase: TouchPhase,
    pub x: f32,
    pub y: f32,
}

// ── Pointer ──────────────────────────────────────────────────────

/// Pointer (mouse/trackpad) button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// One raw pointer event in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    /// Pointer moved to an absolute position.
    Move { x: f32, y: f32 },
    /// Button pressed or released.
    Button { button: PointerButton, pressed: bool },
    /// Scroll wheel delta.
    Scroll { dx: f32, dy: f32 },
}

// ── Keyboard ─────────────────────────────────────────────────────

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const SHIFT = 0x01;
        const CTRL  = 0x02;
        const ALT   = 0x04;
        const META  = 0x08;
    }
}

/// One raw keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Platform virtual key code.
    pub keycode: u16,
    /// Press (true) or release (false).
    pub pressed: bool,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn press(keycode: u16, modifiers: Modifiers) -> Self {
        Self { keycode, pressed: true, modifiers }
    }

    pub fn release(keycode: u16, modifiers: Modifiers) -> Self {
        Self { keycode, pressed: false, modifiers }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(TouchPhase::Ended.is_terminal());
        assert!(TouchPhase::Cancelled.is_terminal());
        assert!(!TouchPhase::Began.is_terminal());
        assert!(!TouchPhase::Moved.is_terminal());
    }

    #[test]
    fn modifier_composition() {
        let ev = KeyEvent::press(0x41, Modifiers::SHIFT | Modifiers::CTRL);
        assert!(ev.modifiers.contains(Modifiers::SHIFT));
        assert!(ev.modifiers.contains(Modifiers::CTRL));
        assert!(!ev.modifiers.contains(Modifiers::ALT));
    }

    #[test]
    fn key_event_constructors() {
        assert!(KeyEvent::press(0x0D, Modifiers::empty()).pressed);
        assert!(!KeyEvent::release(0x0D, Modifiers::empty()).pressed);
    }
}
