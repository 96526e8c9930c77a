// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal input decoding.
//
// Turns raw stdin bytes into one [`Key`] per call. Two layers:
//
// - Pure decode tables ([`decode_byte`], [`decode_escape`]) — total
//   functions from bytes to key symbols, unit-testable without a tty.
// - [`read_key`] — the blocking read loop. Raw reads go through
//   `libc::read` on the stdin fd so the termios VMIN/VTIME policy
//   governs their timing: each read returns immediately with a byte or
//   comes back empty after one decisecond of idle.
//
// # The bare-ESC ambiguity
//
// A lone ESC byte could be the Escape key or the start of an arrow
// sequence. After reading ESC we attempt two follow reads with the
// same short timeout; if either comes back empty, the input is treated
// as a bare Escape. A real sequence split across the timeout boundary
// therefore degrades to Escape — accepted imprecision, never state
// corruption.
//
// # hjkl aliasing
//
// The bytes `h`/`j`/`k`/`l` decode to the same directional variants as
// the arrow escape sequences. This is a deliberate mapping, not a
// numeric accident: a bare `h` and a decoded left-arrow are
// indistinguishable downstream, so the state machine drives vim-style
// and arrow navigation through one match. The price is that hjkl can
// never be bound to anything else in normal mode.

use std::io;

/// The escape byte — introducer of every recognized sequence.
const ESC: u8 = 0x1b;

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded key symbol.
///
/// The directional variants are produced both by the arrow escape
/// sequences and by their hjkl aliases (see the module docs). Control
/// bytes decode to [`Ctrl`](Self::Ctrl) with the un-shifted letter
/// (`0x11` → `Ctrl('q')`); everything else arrives verbatim as
/// [`Char`](Self::Char).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    /// A bare escape keypress, or an unrecognized / truncated escape
    /// sequence that degraded to one.
    Escape,
    /// A control byte, identified by its letter: `0x01` → `Ctrl('a')`,
    /// `0x1a` → `Ctrl('z')`, `0x00` → `Ctrl('@')`.
    Ctrl(char),
    /// Any other byte, verbatim.
    Char(char),
}

impl Key {
    /// The canonical byte this key reports in the insert-mode
    /// diagnostic echo.
    ///
    /// Directional keys report their alias letter — a decoded
    /// left-arrow echoes the same 104 `'h'` a literal `h` does, which
    /// is exactly the aliasing the decoder established on the way in.
    // Chars originate from single input bytes, so the truncating cast
    // cannot lose information.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn echo_byte(self) -> u8 {
        match self {
            Self::Left => b'h',
            Self::Down => b'j',
            Self::Up => b'k',
            Self::Right => b'l',
            Self::Escape => ESC,
            Self::Ctrl(c) => (c as u8) & 0x1f,
            Self::Char(c) => c as u8,
        }
    }
}

// ─── Decode Tables ──────────────────────────────────────────────────────────

/// Decode a single non-sequence byte.
///
/// Total: every byte maps to some key. `0x1b` decodes to a bare
/// [`Key::Escape`] here for totality; [`read_key`] intercepts it
/// first to attempt sequence resolution.
#[must_use]
pub const fn decode_byte(byte: u8) -> Key {
    match byte {
        ESC => Key::Escape,
        b'h' => Key::Left,
        b'j' => Key::Down,
        b'k' => Key::Up,
        b'l' => Key::Right,
        0x00 => Key::Ctrl('@'),
        b @ 0x01..=0x1a => Key::Ctrl((b + b'a' - 1) as char),
        b => Key::Char(b as char),
    }
}

/// Decode the two follow bytes of an escape sequence.
///
/// Only the CSI arrow table is recognized: `[A`/`[B`/`[C`/`[D` →
/// Up/Down/Right/Left. Everything else — wrong introducer, unknown
/// final byte — degrades to a bare [`Key::Escape`].
#[must_use]
pub const fn decode_escape(first: u8, second: u8) -> Key {
    if first != b'[' {
        return Key::Escape;
    }
    match second {
        b'A' => Key::Up,
        b'B' => Key::Down,
        b'C' => Key::Right,
        b'D' => Key::Left,
        _ => Key::Escape,
    }
}

// ─── Reading ────────────────────────────────────────────────────────────────

/// Read one byte from the stdin fd under the raw-mode read policy.
///
/// `Ok(Some(byte))` on data, `Ok(None)` when the VTIME idle timeout
/// expired with nothing available. `EINTR` and `EAGAIN` retry
/// internally.
///
/// # Errors
///
/// Any other read failure is returned, wrapped with the operation name.
#[cfg(unix)]
pub(crate) fn read_stdin_byte() -> io::Result<Option<u8>> {
    let mut byte: u8 = 0;
    loop {
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                (&raw mut byte).cast::<libc::c_void>(),
                1,
            )
        };
        match n {
            1 => return Ok(Some(byte)),
            0 => return Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => {}
                    kind => return Err(io::Error::new(kind, format!("read: {err}"))),
                }
            }
        }
    }
}

/// Non-unix fallback: a plain blocking read with no idle timeout.
/// Escape degradation cannot trigger here; sequences must arrive whole.
#[cfg(not(unix))]
pub(crate) fn read_stdin_byte() -> io::Result<Option<u8>> {
    use std::io::Read;

    let mut byte = [0u8; 1];
    let n = io::stdin().lock().read(&mut byte)?;
    Ok((n == 1).then_some(byte[0]))
}

/// Read the next logical key, blocking until one resolves.
///
/// Busy-polls across idle timeouts for the first byte (the timeout is
/// one decisecond — the poll is cheap and keeps the process responsive
/// to nothing but input, which is all a single-threaded viewer needs).
/// On ESC, attempts the two follow reads and falls back to a bare
/// Escape if either times out.
///
/// # Errors
///
/// Returns an error if the underlying read fails.
pub fn read_key() -> io::Result<Key> {
    let byte = loop {
        if let Some(byte) = read_stdin_byte()? {
            break byte;
        }
    };

    if byte != ESC {
        return Ok(decode_byte(byte));
    }

    let Some(first) = read_stdin_byte()? else {
        return Ok(Key::Escape);
    };
    let Some(second) = read_stdin_byte()? else {
        return Ok(Key::Escape);
    };

    Ok(decode_escape(first, second))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ── Arrow sequences ─────────────────────────────────────────────

    #[test]
    fn csi_a_is_up() {
        assert_eq!(decode_escape(b'[', b'A'), Key::Up);
    }

    #[test]
    fn csi_b_is_down() {
        assert_eq!(decode_escape(b'[', b'B'), Key::Down);
    }

    #[test]
    fn csi_c_is_right() {
        assert_eq!(decode_escape(b'[', b'C'), Key::Right);
    }

    #[test]
    fn csi_d_is_left() {
        assert_eq!(decode_escape(b'[', b'D'), Key::Left);
    }

    #[test]
    fn unknown_csi_final_degrades_to_escape() {
        assert_eq!(decode_escape(b'[', b'Z'), Key::Escape);
        assert_eq!(decode_escape(b'[', b'~'), Key::Escape);
        assert_eq!(decode_escape(b'[', b'a'), Key::Escape);
    }

    #[test]
    fn non_csi_introducer_degrades_to_escape() {
        assert_eq!(decode_escape(b'O', b'A'), Key::Escape);
        assert_eq!(decode_escape(b'x', b'B'), Key::Escape);
    }

    // ── hjkl aliasing ───────────────────────────────────────────────

    #[test]
    fn hjkl_alias_the_arrows() {
        assert_eq!(decode_byte(b'h'), decode_escape(b'[', b'D'));
        assert_eq!(decode_byte(b'j'), decode_escape(b'[', b'B'));
        assert_eq!(decode_byte(b'k'), decode_escape(b'[', b'A'));
        assert_eq!(decode_byte(b'l'), decode_escape(b'[', b'C'));
    }

    #[test]
    fn hjkl_decode_directionally() {
        assert_eq!(decode_byte(b'h'), Key::Left);
        assert_eq!(decode_byte(b'j'), Key::Down);
        assert_eq!(decode_byte(b'k'), Key::Up);
        assert_eq!(decode_byte(b'l'), Key::Right);
    }

    // ── Control bytes ───────────────────────────────────────────────

    #[test]
    fn ctrl_q() {
        assert_eq!(decode_byte(0x11), Key::Ctrl('q'));
    }

    #[test]
    fn ctrl_r() {
        assert_eq!(decode_byte(0x12), Key::Ctrl('r'));
    }

    #[test]
    fn ctrl_a_and_ctrl_z_bracket_the_range() {
        assert_eq!(decode_byte(0x01), Key::Ctrl('a'));
        assert_eq!(decode_byte(0x1a), Key::Ctrl('z'));
    }

    #[test]
    fn nul_is_ctrl_at() {
        assert_eq!(decode_byte(0x00), Key::Ctrl('@'));
    }

    // ── Literal bytes ───────────────────────────────────────────────

    #[test]
    fn printable_bytes_pass_through() {
        assert_eq!(decode_byte(b'i'), Key::Char('i'));
        assert_eq!(decode_byte(b' '), Key::Char(' '));
        assert_eq!(decode_byte(b'~'), Key::Char('~'));
        assert_eq!(decode_byte(b'0'), Key::Char('0'));
    }

    #[test]
    fn capital_hjkl_are_not_aliased() {
        assert_eq!(decode_byte(b'H'), Key::Char('H'));
        assert_eq!(decode_byte(b'J'), Key::Char('J'));
        assert_eq!(decode_byte(b'K'), Key::Char('K'));
        assert_eq!(decode_byte(b'L'), Key::Char('L'));
    }

    #[test]
    fn esc_byte_decodes_to_escape() {
        assert_eq!(decode_byte(0x1b), Key::Escape);
    }

    #[test]
    fn high_bytes_pass_through() {
        assert_eq!(decode_byte(0x7f), Key::Char('\u{7f}'));
        assert_eq!(decode_byte(0xe9), Key::Char('\u{e9}'));
    }

    // ── Echo bytes ──────────────────────────────────────────────────

    #[test]
    fn directional_keys_echo_their_alias_letter() {
        assert_eq!(Key::Left.echo_byte(), b'h');
        assert_eq!(Key::Down.echo_byte(), b'j');
        assert_eq!(Key::Up.echo_byte(), b'k');
        assert_eq!(Key::Right.echo_byte(), b'l');
    }

    #[test]
    fn arrow_and_alias_echo_identically() {
        // The observable quirk the aliasing implies: left-arrow echoes
        // the same byte a literal h does.
        assert_eq!(
            decode_escape(b'[', b'D').echo_byte(),
            decode_byte(b'h').echo_byte()
        );
    }

    #[test]
    fn ctrl_echoes_the_control_byte() {
        assert_eq!(Key::Ctrl('q').echo_byte(), 0x11);
        assert_eq!(Key::Ctrl('a').echo_byte(), 0x01);
    }

    #[test]
    fn escape_echoes_0x1b() {
        assert_eq!(Key::Escape.echo_byte(), 0x1b);
    }

    #[test]
    fn char_echoes_itself() {
        assert_eq!(Key::Char('x').echo_byte(), b'x');
    }

    // ── Round trips ─────────────────────────────────────────────────

    #[test]
    fn every_byte_decodes_to_something() {
        // decode_byte is total — no byte may panic or be dropped.
        for byte in 0..=u8::MAX {
            let _ = decode_byte(byte);
        }
    }

    #[test]
    fn non_directional_bytes_echo_verbatim() {
        for byte in 0..=u8::MAX {
            match decode_byte(byte) {
                Key::Up | Key::Down | Key::Left | Key::Right => {}
                key => assert_eq!(key.echo_byte(), byte, "byte {byte:#x}"),
            }
        }
    }
}
