//! Modal interaction state.
//!
//! The viewer is always in exactly one [`Mode`]. The mode changes how
//! keys are interpreted, nothing more — dispatch lives in the state
//! machine, this is pure data.

use std::fmt;

/// The current interaction mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Default mode. Keys are navigation commands.
    #[default]
    Normal,
    /// Entered with `i`, left with Escape. No text is actually
    /// inserted — the viewer has no edit surface — so keys in this
    /// mode are only acknowledged with a diagnostic echo.
    Insert,
    /// Reserved. Declared for the modal vocabulary, but no key
    /// transitions into it and it has no behavior.
    Visual,
}

impl Mode {
    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Visual => "VISUAL",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
