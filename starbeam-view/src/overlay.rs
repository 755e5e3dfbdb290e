//! On-screen control overlay state.
//!
//! The overlay itself is drawn by the platform layer; this tracks the
//! requested detail level and visibility, and resolves the `Auto`
//! preference from the number of attached controllers.

use starbeam_core::{ControllerSupport, OscLevel};

/// Visibility and detail level of the on-screen controls.
#[derive(Debug)]
pub struct OnScreenControls {
    preference: OscLevel,
    controller_count: u8,
    visible: bool,
    needs_redraw: bool,
}

impl OnScreenControls {
    pub fn new(support: &ControllerSupport) -> Self {
        Self {
            preference: support.osc_preference,
            controller_count: support.controller_count,
            visible: false,
            needs_redraw: false,
        }
    }

    /// The effective level: `Auto` hides the overlay while a physical
    /// controller is attached and shows the full set otherwise.
    pub fn level(&self) -> OscLevel {
        match self.preference {
            OscLevel::Auto => {
                if self.controller_count > 0 {
                    OscLevel::Off
                } else {
                    OscLevel::Full
                }
            }
            other => other,
        }
    }

    /// Make the overlay visible at its effective level.
    pub fn show(&mut self) {
        if self.level() == OscLevel::Off {
            return;
        }
        if !self.visible {
            self.visible = true;
            self.needs_redraw = true;
        }
    }

    pub fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.needs_redraw = true;
        }
    }

    pub fn set_level(&mut self, level: OscLevel) {
        if self.preference != level {
            self.preference = level;
            self.needs_redraw = self.visible;
        }
    }

    /// Update the attached-controller count (affects `Auto`).
    pub fn set_controller_count(&mut self, count: u8) {
        if self.controller_count != count {
            self.controller_count = count;
            self.needs_redraw = self.visible;
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Consume the redraw flag.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_from_controller_count() {
        let osc = OnScreenControls::new(&ControllerSupport {
            controller_count: 1,
            osc_preference: OscLevel::Auto,
        });
        assert_eq!(osc.level(), OscLevel::Off);

        let osc = OnScreenControls::new(&ControllerSupport {
            controller_count: 0,
            osc_preference: OscLevel::Auto,
        });
        assert_eq!(osc.level(), OscLevel::Full);
    }

    #[test]
    fn show_is_a_no_op_when_level_is_off() {
        let mut osc = OnScreenControls::new(&ControllerSupport {
            controller_count: 2,
            osc_preference: OscLevel::Auto,
        });
        osc.show();
        assert!(!osc.visible());
        assert!(!osc.take_needs_redraw());
    }

    #[test]
    fn show_hide_toggles_and_flags_redraw() {
        let mut osc = OnScreenControls::new(&ControllerSupport {
            controller_count: 0,
            osc_preference: OscLevel::Simple,
        });
        osc.show();
        assert!(osc.visible());
        assert!(osc.take_needs_redraw());
        // Showing again changes nothing.
        osc.show();
        assert!(!osc.take_needs_redraw());

        osc.hide();
        assert!(!osc.visible());
        assert!(osc.take_needs_redraw());
    }
}
