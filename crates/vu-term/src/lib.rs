// SPDX-License-Identifier: MIT
//
// vu-term — Terminal layer for vu.
//
// Raw termios control, ANSI escape output, frame staging, and key
// decoding, with no TUI framework in between. The viewer talks to the
// terminal the way the terminal actually works: one raw file
// descriptor in, one batched escape-sequence frame out.
//
// This crate intentionally avoids crossterm and friends. The whole
// point of the program is direct control over the line discipline and
// over every byte sent to the terminal; an abstraction layer would
// make those choices for us.

pub mod ansi;
pub mod input;
pub mod output;
pub mod terminal;

use std::io;

/// Wrap the current OS error with the name of the failing call.
///
/// The fatal-error path prints this as `vu: <op>: <os description>`,
/// so every syscall failure names its operation. Must be called
/// immediately after the failing call, before anything else can
/// clobber `errno`.
pub(crate) fn os_error(op: &str) -> io::Error {
    let err = io::Error::last_os_error();
    io::Error::new(err.kind(), format!("{op}: {err}"))
}
