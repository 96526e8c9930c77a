// SPDX-License-Identifier: MIT
//
// vu — a minimal terminal text viewer with vim-style navigation.
//
// This is the main binary that wires together the crates:
//
//   vu-term   → raw mode, ANSI output, frame staging, key decoding
//   vu-editor → document rows, modes, viewport state, render pipeline
//
// Each keypress flows through:
//
//   stdin → read_key → EditorState::handle_key → Action
//   Redraw      → render full frame into the append buffer, one write
//   Reposition  → emit only the cursor-position sequence
//   Echo        → insert-mode diagnostic acknowledgement
//   Quit        → leave the loop; the Terminal guard restores cooked mode
//
// Fatal errors propagate out of run() with `?`; the Terminal guard
// drops on the way, so the terminal is already restored when main
// prints the failing operation and exits non-zero. That ordering is
// what makes the message readable in the user's shell.

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use vu_editor::document::Document;
use vu_editor::state::{Action, EditorState};
use vu_editor::view;
use vu_term::ansi;
use vu_term::input::{self, Key};
use vu_term::output::AppendBuffer;
use vu_term::terminal::Terminal;

fn main() {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Usage: vu <file>");
        process::exit(1);
    };

    if let Err(err) = run(Path::new(&path)) {
        // The guard inside run() has already restored cooked mode.
        // Clear the raw-mode leftovers so the message lands on a clean
        // screen, then report.
        let mut stdout = io::stdout();
        let _ = ansi::clear_screen(&mut stdout);
        let _ = ansi::cursor_home(&mut stdout);
        let _ = stdout.flush();

        eprintln!("vu: {err}");
        process::exit(1);
    }
}

fn run(path: &Path) -> io::Result<()> {
    let mut term = Terminal::new();
    term.enter()?;

    let size = term.size()?;
    let doc = Document::open(path)?;
    let mut state = EditorState::new(size);
    let mut frame = AppendBuffer::new();

    refresh(&doc, &mut state, &mut frame)?;

    loop {
        let key = input::read_key()?;
        match state.handle_key(key, &doc) {
            Action::None => {}
            Action::Reposition => reposition(&state)?,
            Action::Redraw => refresh(&doc, &mut state, &mut frame)?,
            Action::Echo(key) => echo(key)?,
            Action::Quit => break,
        }
    }

    term.leave()
}

/// Full repaint: enforce the viewport invariant, stage the frame, and
/// push it to the terminal in one write.
fn refresh(doc: &Document, state: &mut EditorState, frame: &mut AppendBuffer) -> io::Result<()> {
    state.scroll();
    view::render(doc, state, frame)?;
    frame.flush_stdout()
}

/// Cheap path: motion that stays inside the viewport only moves the
/// hardware cursor, no row content changes.
fn reposition(state: &EditorState) -> io::Result<()> {
    let (x, y) = state.cursor_screen_position();
    let mut stdout = io::stdout().lock();
    ansi::cursor_to(&mut stdout, x, y)?;
    stdout.flush()
}

/// Insert-mode diagnostic echo: the key is acknowledged, not applied —
/// there is no edit surface. Prints the byte value and its character.
fn echo(key: Key) -> io::Result<()> {
    let byte = key.echo_byte();
    let mut stdout = io::stdout().lock();
    write!(stdout, "{} ('{}')\r\n", byte, byte as char)?;
    stdout.flush()
}
