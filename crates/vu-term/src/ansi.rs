// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No
// state, no decisions about when to emit — the render pipeline and the
// terminal controller decide that. This module just knows the
// byte-level encoding of every terminal command the viewer uses.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI CUP uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying
// writer. In practice they never fail when writing to `AppendBuffer`
// (backed by a Vec).

use std::io::{self, Write};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Home the cursor — row 1, column 1. Same as CUP with default args.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[H")
}

/// Hide the cursor (DECTCEM reset).
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

/// Push the cursor toward the bottom-right corner: 999 columns forward
/// (CUF), then 999 rows down (CUD). Both motions clamp at the screen
/// edge, which is what makes this usable as a size probe — ask the
/// terminal where the cursor ended up and you have the dimensions.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn cursor_bottom_right(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[999C\x1b[999B")
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The terminal answers on stdin with `ESC [ {row} ; {col} R`.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[6n")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Clear from the cursor to the end of the line (EL 0).
///
/// Emitted after each rendered row so a shorter new line fully
/// overwrites a longer previous one.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[K")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: run an emitter against a Vec and return the bytes.
    fn emit(f: impl Fn(&mut Vec<u8>) -> io::Result<()>) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        buf
    }

    #[test]
    fn cursor_to_is_one_indexed() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), b"\x1b[1;1H");
    }

    #[test]
    fn cursor_to_row_before_column() {
        // CUP takes row first; our API is (x, y).
        assert_eq!(emit(|w| cursor_to(w, 4, 9)), b"\x1b[10;5H");
    }

    #[test]
    fn cursor_home_sequence() {
        assert_eq!(emit(|w| cursor_home(w)), b"\x1b[H");
    }

    #[test]
    fn cursor_hide_sequence() {
        assert_eq!(emit(|w| cursor_hide(w)), b"\x1b[?25l");
    }

    #[test]
    fn cursor_show_sequence() {
        assert_eq!(emit(|w| cursor_show(w)), b"\x1b[?25h");
    }

    #[test]
    fn cursor_bottom_right_sequence() {
        assert_eq!(emit(|w| cursor_bottom_right(w)), b"\x1b[999C\x1b[999B");
    }

    #[test]
    fn request_cursor_position_sequence() {
        assert_eq!(emit(|w| request_cursor_position(w)), b"\x1b[6n");
    }

    #[test]
    fn clear_screen_sequence() {
        assert_eq!(emit(|w| clear_screen(w)), b"\x1b[2J");
    }

    #[test]
    fn clear_line_sequence() {
        assert_eq!(emit(|w| clear_line(w)), b"\x1b[K");
    }
}
