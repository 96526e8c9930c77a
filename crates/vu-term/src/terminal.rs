// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, size query, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), and raw fd writes. These are the
// standard POSIX interfaces for terminal control — there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. The `Terminal` guard
// captures the pristine termios attributes once, applies a derived raw
// set, and guarantees the pristine set comes back on every exit path:
// normal quit, a `?`-propagated fatal error, or a panic mid-frame.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a
// pre-built reset sequence directly to fd 1. This prevents deadlock if
// the panic happened while the lock was held (common during a frame
// flush). One raw write, termios restored from the global backup, then
// the original panic handler prints its message to a working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

#[cfg(unix)]
use crate::ansi;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the pristine termios for panic recovery.
///
/// The [`Terminal`] guard owns its own copy, but the panic hook can't
/// reach it. This backup — behind a [`Mutex`], not `static mut` — lets
/// the hook restore cooked mode without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref pristine) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, pristine);
            }
        }
    }
}

/// Screen reset sequence for the fatal path: clear the whole screen,
/// home the cursor, show the cursor. Leaves the user's shell with a
/// clean prompt area so the error message that follows is readable.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the message.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the screen reset sequence directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the
/// panic occurred while the lock was held.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Raw Attribute Derivation ───────────────────────────────────────────────

/// Derive the raw-mode attribute set from the pristine snapshot.
///
/// Input: no software flow control (IXON), no CR→LF translation
/// (ICRNL), no break-condition SIGINT (BRKINT), no parity checking
/// (INPCK), no 8th-bit stripping (ISTRIP). Output: no post-processing
/// at all (OPOST) — every `\n` we want must be an explicit `\r\n`.
/// Control: 8-bit character frames (CS8). Local: no echo, no canonical
/// line buffering, no keyboard signals (ISIG), no literal-next/discard
/// (IEXTEN).
///
/// `VMIN = 0` / `VTIME = 1`: a non-canonical read returns immediately
/// with whatever bytes are available, or empty after one decisecond of
/// idle. The key decoder relies on this bounded timeout both for its
/// retry loop and for resolving the bare-ESC ambiguity.
#[cfg(unix)]
fn raw_attributes(pristine: &libc::termios) -> libc::termios {
    let mut raw = *pristine;
    raw.c_iflag &= !(libc::IXON | libc::ICRNL | libc::BRKINT | libc::INPCK | libc::ISTRIP);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = 1;
    raw
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to raw mode. The pristine
/// attributes are restored when the guard is dropped — even on panic.
/// Fatal-error paths must route through this guard (let it drop) rather
/// than calling `process::exit` directly, so restoration is never
/// skipped.
///
/// # Example
///
/// ```no_run
/// use vu_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// let size = term.size()?;
/// // ... read keys, render frames ...
/// // Raw mode is undone automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Pristine termios captured before entering raw mode. Never
    /// mutated after capture; restoration always reapplies this exact
    /// snapshot.
    #[cfg(unix)]
    pristine: Option<libc::termios>,

    /// Whether raw mode is currently applied.
    active: bool,
}

impl Terminal {
    /// Create an inactive terminal handle.
    ///
    /// Does **not** touch the terminal — call [`enter`](Self::enter)
    /// for that.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(unix)]
            pristine: None,
            active: false,
        }
    }

    /// Whether raw mode is currently applied.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode.
    ///
    /// Captures the pristine attributes, installs the panic hook (once
    /// per process), applies the derived raw set with `TCSAFLUSH`
    /// (pending output flushed, unread input discarded). Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute capture or apply fails. Both
    /// are fatal to the caller: without a known terminal state, no
    /// subsequent key decoding can be trusted. A capture failure means
    /// no raw-mode state exists yet, so nothing needs restoring.
    #[cfg(unix)]
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(crate::os_error("tcgetattr"));
            }

            self.pristine = Some(termios);

            // Also save to the global backup for the panic hook.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            let raw = raw_attributes(&termios);
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const raw) != 0 {
                return Err(crate::os_error("tcsetattr"));
            }
        }

        self.active = true;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn enter(&mut self) -> io::Result<()> {
        self.active = true;
        Ok(())
    }

    /// Leave raw mode, reapplying the pristine snapshot.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the attribute apply fails — fatal to the
    /// caller, since the terminal is in an unknown state.
    #[cfg(unix)]
    pub fn leave(&mut self) -> io::Result<()> {
        if let Some(ref pristine) = self.pristine {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, pristine) != 0 {
                    return Err(crate::os_error("tcsetattr"));
                }
            }

            // Restored — the panic hook no longer needs the backup.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.pristine = None;
        }

        self.active = false;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn leave(&mut self) -> io::Result<()> {
        self.active = false;
        Ok(())
    }

    /// Query the terminal dimensions.
    ///
    /// Tries `ioctl(TIOCGWINSZ)` first. If that fails or reports zero
    /// columns, falls back to the cursor probe: push the cursor to the
    /// bottom-right extreme and ask the terminal where it landed. The
    /// probe needs raw mode active (the position report arrives as
    /// unbuffered stdin bytes) and is best-effort — a malformed report
    /// yields the combined failure, never a parse error of its own.
    ///
    /// # Errors
    ///
    /// Returns an error when both the ioctl and the probe fail. The
    /// startup sequence treats this as fatal: every later scroll and
    /// render computation depends on the dimensions.
    pub fn size(&self) -> io::Result<Size> {
        if let Some(size) = ioctl_size() {
            return Ok(size);
        }
        self.probe_size()
            .ok_or_else(|| io::Error::other("window size query failed"))
    }

    /// Fallback size query via cursor probe.
    ///
    /// Emits `ESC[999C ESC[999B` (cursor clamps at the bottom-right
    /// corner), then DSR 6, and parses the `ESC[{row};{col}R` report
    /// from stdin. Any hiccup — write failure, timeout, malformed
    /// report — yields `None`.
    #[cfg(unix)]
    fn probe_size(&self) -> Option<Size> {
        if !self.active {
            // Without raw mode the report would sit in the line buffer.
            return None;
        }

        {
            let mut stdout = io::stdout().lock();
            ansi::cursor_bottom_right(&mut stdout).ok()?;
            ansi::request_cursor_position(&mut stdout).ok()?;
            stdout.flush().ok()?;
        }

        let mut report = [0u8; 32];
        let mut len = 0;
        while len < report.len() {
            match crate::input::read_stdin_byte().ok()? {
                Some(byte) => {
                    report[len] = byte;
                    len += 1;
                    if byte == b'R' {
                        break;
                    }
                }
                // Timeout — the terminal never answered.
                None => break,
            }
        }

        parse_cursor_report(&report[..len])
    }

    #[cfg(not(unix))]
    #[allow(clippy::unused_self)]
    fn probe_size(&self) -> Option<Size> {
        None
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if the query fails or reports a degenerate size.
#[cfg(unix)]
fn ioctl_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
fn ioctl_size() -> Option<Size> {
    None
}

// ─── Cursor Report Parsing ──────────────────────────────────────────────────

/// Parse a DSR 6 cursor position report: `ESC [ {row} ; {col} R`.
///
/// Returns `None` for anything malformed or degenerate — the caller
/// treats that as "probe failed", not as an error in its own right.
fn parse_cursor_report(report: &[u8]) -> Option<Size> {
    let rest = report.strip_prefix(b"\x1b[")?;
    let (rows, rest) = parse_u16(rest)?;
    let rest = rest.strip_prefix(b";")?;
    let (cols, rest) = parse_u16(rest)?;
    if rest.first() == Some(&b'R') && rows > 0 && cols > 0 {
        Some(Size { cols, rows })
    } else {
        None
    }
}

/// Parse a decimal u16 from the start of a byte slice.
/// Returns `(value, remaining_bytes)`, or `None` if no digit leads.
fn parse_u16(buf: &[u8]) -> Option<(u16, &[u8])> {
    let mut val: u16 = 0;
    let mut pos = 0;
    while pos < buf.len() && buf[pos].is_ascii_digit() {
        val = val
            .saturating_mul(10)
            .saturating_add(u16::from(buf[pos] - b'0'));
        pos += 1;
    }
    if pos == 0 {
        return None;
    }
    Some((val, &buf[pos..]))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
