//! Render pipeline — composes one full frame into an append buffer.
//!
//! One call to [`render`] stages a complete screen: hide the cursor
//! (no visible flash while it jumps to the top-left mid-redraw), home,
//! every screen row's content, the absolute cursor position, show the
//! cursor. The caller flushes the buffer to the terminal in a single
//! write.
//!
//! Rendering is pure with respect to its inputs: the same document and
//! state always produce byte-identical frames. The scroll offset is
//! taken as-is — run [`EditorState::scroll`] before rendering so the
//! viewport invariant holds.
//!
//! Row bytes are truncated at the screen width, never wrapped. Screen
//! rows past the end of the document get a `~` fill marker. Every row
//! ends with clear-to-end-of-line so a shorter new line fully
//! overwrites a longer previous one, and rows are separated by an
//! explicit `\r\n` — output post-processing is off, nobody expands
//! `\n` for us.

use std::io::{self, Write};

use vu_term::ansi;
use vu_term::output::AppendBuffer;

use crate::document::Document;
use crate::state::EditorState;

/// Marker drawn on screen rows past the end of the document.
const FILL_MARKER: &[u8] = b"~";

/// Stage one full frame into `out`.
///
/// # Errors
///
/// Propagates write errors; against an [`AppendBuffer`] these cannot
/// occur in practice.
pub fn render(doc: &Document, state: &EditorState, out: &mut AppendBuffer) -> io::Result<()> {
    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;
    draw_rows(doc, state, out)?;
    let (x, y) = state.cursor_screen_position();
    ansi::cursor_to(out, x, y)?;
    ansi::cursor_show(out)?;
    Ok(())
}

/// Emit every screen row: document content where the viewport covers
/// it, fill markers below the end of the document.
fn draw_rows(doc: &Document, state: &EditorState, out: &mut AppendBuffer) -> io::Result<()> {
    let screen_rows = state.screen_rows();
    let screen_cols = state.screen_cols();

    for y in 0..screen_rows {
        let file_row = y + state.row_offset();
        match doc.row(file_row) {
            Some(row) => {
                let visible = row.len().min(screen_cols);
                out.write_all(&row.bytes()[..visible])?;
            }
            None => out.write_all(FILL_MARKER)?,
        }

        ansi::clear_line(out)?;
        if y + 1 < screen_rows {
            out.write_all(b"\r\n")?;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Row;
    use pretty_assertions::assert_eq;
    use vu_term::input::Key;
    use vu_term::terminal::Size;

    fn doc(lines: &[&str]) -> Document {
        let mut doc = Document::new();
        for line in lines {
            doc.push(Row::new(line.as_bytes().to_vec()));
        }
        doc
    }

    fn state(cols: u16, rows: u16) -> EditorState {
        EditorState::new(Size { cols, rows })
    }

    fn frame(doc: &Document, state: &EditorState) -> Vec<u8> {
        let mut out = AppendBuffer::new();
        render(doc, state, &mut out).unwrap();
        out.as_bytes().to_vec()
    }

    // -- Full-frame scenarios -----------------------------------------------

    #[test]
    fn initial_frame_on_a_24x80_screen() {
        let doc = doc(&["a", "bb", "ccc"]);
        let s = state(80, 24);

        let mut expected = Vec::new();
        expected.extend_from_slice(b"\x1b[?25l\x1b[H");
        expected.extend_from_slice(b"a\x1b[K\r\n");
        expected.extend_from_slice(b"bb\x1b[K\r\n");
        expected.extend_from_slice(b"ccc\x1b[K\r\n");
        for _ in 0..20 {
            expected.extend_from_slice(b"~\x1b[K\r\n");
        }
        expected.extend_from_slice(b"~\x1b[K"); // last row: no \r\n
        expected.extend_from_slice(b"\x1b[1;1H\x1b[?25h");

        assert_eq!(frame(&doc, &s), expected);
    }

    #[test]
    fn empty_document_is_all_fill_markers() {
        let doc = doc(&[]);
        let s = state(10, 3);

        assert_eq!(
            frame(&doc, &s),
            b"\x1b[?25l\x1b[H~\x1b[K\r\n~\x1b[K\r\n~\x1b[K\x1b[1;1H\x1b[?25h"
        );
    }

    #[test]
    fn repeated_render_is_byte_identical() {
        let doc = doc(&["alpha", "beta"]);
        let s = state(40, 12);

        assert_eq!(frame(&doc, &s), frame(&doc, &s));
    }

    // -- Truncation ---------------------------------------------------------

    #[test]
    fn long_rows_truncate_at_screen_width() {
        let doc = doc(&["0123456789"]);
        let s = state(4, 1);

        assert_eq!(frame(&doc, &s), b"\x1b[?25l\x1b[H0123\x1b[K\x1b[1;1H\x1b[?25h");
    }

    #[test]
    fn row_exactly_screen_width_is_untruncated() {
        let doc = doc(&["abcd"]);
        let s = state(4, 1);

        assert_eq!(frame(&doc, &s), b"\x1b[?25l\x1b[Habcd\x1b[K\x1b[1;1H\x1b[?25h");
    }

    // -- Scrolled viewport --------------------------------------------------

    #[test]
    fn scrolled_frame_starts_at_the_offset_row() {
        let doc = doc(&["0", "1", "2", "3", "4"]);
        let mut s = state(10, 2);

        // Walk down to row 3: offset becomes 2, viewport shows rows 2–3.
        for _ in 0..3 {
            s.handle_key(Key::Down, &doc);
        }
        s.scroll();

        assert_eq!(
            frame(&doc, &s),
            b"\x1b[?25l\x1b[H2\x1b[K\r\n3\x1b[K\x1b[2;1H\x1b[?25h"
        );
    }

    #[test]
    fn cursor_sequence_tracks_screen_position() {
        let doc = doc(&["abcdef"]);
        let mut s = state(80, 24);

        s.handle_key(Key::Right, &doc);
        s.handle_key(Key::Right, &doc);

        let bytes = frame(&doc, &s);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("\x1b[1;3H"), "column 2 → 1-based column 3");
    }

    // -- Frame structure ----------------------------------------------------

    #[test]
    fn frame_hides_cursor_first_and_shows_it_last() {
        let doc = doc(&["a"]);
        let s = state(10, 2);

        let bytes = frame(&doc, &s);
        assert!(bytes.starts_with(b"\x1b[?25l"));
        assert!(bytes.ends_with(b"\x1b[?25h"));
    }

    #[test]
    fn every_screen_row_gets_clear_to_eol() {
        let doc = doc(&["a", "b"]);
        let s = state(10, 5);

        let bytes = frame(&doc, &s);
        let count = bytes
            .windows(3)
            .filter(|window| *window == b"\x1b[K")
            .count();
        assert_eq!(count, 5);
    }

    #[test]
    fn rows_are_separated_by_explicit_crlf() {
        let doc = doc(&["a", "b", "c"]);
        let s = state(10, 3);

        let bytes = frame(&doc, &s);
        let count = bytes
            .windows(2)
            .filter(|window| *window == b"\r\n")
            .count();
        assert_eq!(count, 2, "separators only between rows, none after the last");
    }
}
