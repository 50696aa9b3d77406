use std::io::{self, Write};

use crate::error::BrainfuckError;

/// Pretty-print a [`BrainfuckError`] to stderr.
///
/// If `program` is `Some("bfrun")`, messages are prefixed with
/// "bfrun: ..." for CLI use. Compile-time errors carry a character
/// position into `code` and get a caret context window; runtime errors
/// position into the folded command sequence, so they are printed without
/// one.
pub fn print_error(program: Option<&str>, code: &str, err: &BrainfuckError) {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        BrainfuckError::UnmatchedBrackets { pos, kind } => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {kind}"));
            print_error_with_context(&msg, code, *pos);
        }
        BrainfuckError::BufferOverflow { pc, ptr } => {
            eprintln!(
                "{}",
                prefix_program(&format!(
                    "Runtime error: buffer overflow at command {pc} (ptr={ptr})"
                ))
            );
        }
        BrainfuckError::BufferUnderflow { pc, ptr, cell } => {
            eprintln!(
                "{}",
                prefix_program(&format!(
                    "Runtime error: buffer underflow at command {pc} (ptr={ptr}, cell={cell})"
                ))
            );
        }
        BrainfuckError::Io { pc, source } => {
            eprintln!(
                "{}",
                prefix_program(&format!("I/O error at command {pc}: {source}"))
            );
        }
        BrainfuckError::SourceUnavailable { path, source } => {
            eprintln!(
                "{}",
                prefix_program(&format!("cannot read source {}: {source}", path.display()))
            );
        }
    }
    let _ = io::stderr().flush();
}

/// Print a concise error with character position and a caret context
/// window, working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix} at position {pos}");

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let start_byte = char_to_byte_index(code, start_char);
    let end_byte = char_to_byte_index(code, end_char);
    let slice = &code[start_byte..end_byte];

    eprintln!("  {}", slice);

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    let mut underline = String::new();
    for _ in 0..caret_offset_chars {
        underline.push(' ');
    }
    underline.push('^');
    eprintln!("  {}", underline);
    let _ = io::stderr().flush();
}

/// Convert a char index into a byte index in the given UTF-8 string.
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    if char_idx == 0 {
        return 0;
    }

    let mut count = 0usize;
    let mut byte_idx = 0usize;

    for ch in s.chars() {
        if count == char_idx {
            break;
        }
        byte_idx += ch.len_utf8();
        count += 1;
    }

    byte_idx
}
