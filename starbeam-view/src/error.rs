//! Error types for the presentation layer.
//!
//! Two failure classes exist here: setup failures, surfaced before any
//! draw occurs, and per-frame failures, which are logged on the draw
//! path and recovered by keeping the previous frame on screen.

use thiserror::Error;

/// The canonical error type for the view layer.
#[derive(Debug, Error)]
pub enum ViewError {
    // ── Setup Errors ─────────────────────────────────────────────
    /// The surface has no usable render backend. Fatal: checked at
    /// configure time, never on the draw path.
    #[error("no render capability available")]
    NoRenderCapability,

    /// An operation that requires `configure` ran before it.
    #[error("surface is not configured")]
    NotConfigured,

    /// `configure` was called twice.
    #[error("surface is already configured")]
    AlreadyConfigured,

    /// The surface was torn down and no longer accepts draws.
    #[error("surface is torn down")]
    TornDown,

    /// A pointer-only operation ran on a surface without pointer
    /// support (TV-style form factors).
    #[error("surface has no pointer support")]
    PointerUnsupported,

    // ── Per-frame Errors ─────────────────────────────────────────
    /// A submitted frame does not match its declared pixel layout.
    #[error("invalid frame: {0}")]
    InvalidFrame(&'static str),

    /// A frame plane is shorter than its layout requires.
    #[error("plane {plane} too short: {len} bytes ({need} required)")]
    PlaneTooShort {
        plane: usize,
        len: usize,
        need: usize,
    },

    /// The backend rejected a texture upload or draw.
    #[error("backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = ViewError::PlaneTooShort {
            plane: 1,
            len: 100,
            need: 200,
        };
        assert!(e.to_string().contains("100"));
        assert!(e.to_string().contains("200"));

        let e = ViewError::NoRenderCapability;
        assert!(e.to_string().contains("render"));
    }
}
