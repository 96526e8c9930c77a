//! Editor state machine — cursor, viewport scroll, and key dispatch.
//!
//! [`EditorState`] owns the cursor position, the vertical scroll
//! offset, the screen dimensions, and the interaction [`Mode`]. It is
//! a plain value: the document is passed by reference into
//! [`handle_key`](EditorState::handle_key), and the result is an
//! [`Action`] telling the caller what the keypress requires — nothing
//! here touches the terminal.
//!
//! # Viewport invariant
//!
//! After every [`scroll`](EditorState::scroll) recomputation:
//!
//! ```text
//! scroll_offset <= cursor_row < scroll_offset + screen_rows
//! ```
//!
//! The viewport always contains the cursor row. Vertical motion clamps
//! the cursor to `[0, num_rows - 1]`; horizontal motion clamps to
//! `[0, screen_cols - 1]` — the screen width, deliberately not the
//! current row's length, so the cursor may sit past the end of a short
//! line.

use vu_term::input::Key;
use vu_term::terminal::Size;

use crate::document::Document;
use crate::mode::Mode;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What the main loop should do after a keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing visible changed.
    None,
    /// Only the hardware cursor moved — emit the cursor-position
    /// sequence, skip the frame repaint. The cheap path for motion
    /// that stays inside the viewport.
    Reposition,
    /// Repaint the whole frame.
    Redraw,
    /// Acknowledge a key with the insert-mode diagnostic echo.
    Echo(Key),
    /// Leave the main loop; the terminal guard restores cooked mode on
    /// the way out.
    Quit,
}

// ---------------------------------------------------------------------------
// EditorState
// ---------------------------------------------------------------------------

/// Cursor, scroll, screen, and mode state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    /// Cursor row in document coordinates (0-based).
    cursor_row: usize,
    /// Cursor column in screen coordinates (0-based).
    cursor_col: usize,
    /// First visible document row.
    row_offset: usize,
    /// Screen dimensions, queried once at startup.
    size: Size,
    /// Current interaction mode.
    mode: Mode,
}

impl EditorState {
    /// Create the initial state: cursor at the origin, no scroll,
    /// normal mode.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            row_offset: 0,
            size,
            mode: Mode::Normal,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Cursor row in document coordinates.
    #[inline]
    #[must_use]
    pub const fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    /// Cursor column in screen coordinates.
    #[inline]
    #[must_use]
    pub const fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    /// First visible document row.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// Current interaction mode.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Screen height in rows.
    #[inline]
    #[must_use]
    pub fn screen_rows(&self) -> usize {
        usize::from(self.size.rows)
    }

    /// Screen width in columns.
    #[inline]
    #[must_use]
    pub fn screen_cols(&self) -> usize {
        usize::from(self.size.cols)
    }

    /// The cursor's screen position `(x, y)`, 0-indexed.
    ///
    /// Valid after a [`scroll`](Self::scroll) recomputation, which
    /// guarantees the cursor row is inside the viewport.
    // The viewport invariant bounds both values by the u16 screen
    // dimensions.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn cursor_screen_position(&self) -> (u16, u16) {
        (
            self.cursor_col as u16,
            (self.cursor_row - self.row_offset) as u16,
        )
    }

    // -- Scrolling ----------------------------------------------------------

    /// Recompute the scroll offset so the viewport contains the cursor
    /// row. Returns whether the offset changed — a changed offset
    /// means the frame must be repainted, an unchanged one lets the
    /// caller get away with repositioning the hardware cursor only.
    pub fn scroll(&mut self) -> bool {
        let mut scrolled = false;
        if self.cursor_row < self.row_offset {
            self.row_offset = self.cursor_row;
            scrolled = true;
        }
        if self.cursor_row >= self.row_offset + self.screen_rows() {
            self.row_offset = self.cursor_row + 1 - self.screen_rows();
            scrolled = true;
        }
        scrolled
    }

    // -- Key dispatch -------------------------------------------------------

    /// Interpret one key in the current mode.
    pub fn handle_key(&mut self, key: Key, doc: &Document) -> Action {
        match self.mode {
            Mode::Normal => self.handle_normal(key, doc),
            Mode::Insert => self.handle_insert(key),
            // Reserved: no transitions, no behavior.
            Mode::Visual => Action::None,
        }
    }

    fn handle_normal(&mut self, key: Key, doc: &Document) -> Action {
        match key {
            Key::Down => {
                if self.cursor_row + 1 < doc.len() {
                    self.cursor_row += 1;
                }
                self.vertical_action()
            }
            Key::Up => {
                if self.cursor_row > 0 {
                    self.cursor_row -= 1;
                }
                self.vertical_action()
            }
            Key::Right => {
                if self.cursor_col + 1 < self.screen_cols() {
                    self.cursor_col += 1;
                }
                Action::Reposition
            }
            Key::Left => {
                if self.cursor_col > 0 {
                    self.cursor_col -= 1;
                }
                Action::Reposition
            }
            Key::Char('i') => {
                self.mode = Mode::Insert;
                Action::None
            }
            Key::Ctrl('q') => Action::Quit,
            Key::Ctrl('r') => Action::Redraw,
            _ => Action::None,
        }
    }

    fn handle_insert(&mut self, key: Key) -> Action {
        match key {
            Key::Escape => {
                self.mode = Mode::Normal;
                Action::None
            }
            Key::Ctrl('q') => Action::Quit,
            Key::Ctrl('r') => Action::Redraw,
            // No edit surface: the key is acknowledged, not applied.
            // Directional keys land here too and echo their alias byte.
            other => Action::Echo(other),
        }
    }

    /// Shared tail of the vertical handlers: rescroll, then pick the
    /// cheap or the full path.
    fn vertical_action(&mut self) -> Action {
        if self.scroll() {
            Action::Redraw
        } else {
            Action::Reposition
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
