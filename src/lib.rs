//! A compiling Brainfuck interpreter library.
//!
//! Programs go through two stages: [`compile`] turns source text into a
//! run-length folded command sequence with resolved loop brackets, and
//! [`Engine`] interprets that sequence against a memory tape (default
//! 30,000 cells) with a single data pointer.
//!
//! Features and behaviors:
//! - Memory tape initialized to 0 at the start of each run.
//! - Runs of identical commands fold into one counted command; `[-]`
//!   compiles to a direct clear-cell instruction.
//! - Movement never checks bounds; commands that touch the tape fail with
//!   a buffer overflow once the pointer has drifted out of range.
//! - Cells wrap modulo 256 by default; an opt-in strict policy reports
//!   boundary crossings as errors instead.
//! - Input `,` reads a single raw byte; on end of stream the cell is set
//!   to 0. Output `.` emits the cell as one byte (no newline).
//! - Unmatched brackets are reported at compile time, before any output.
//! - Any non-Brainfuck character is a comment and is skipped.
//!
//! Quick start:
//!
//! ```no_run
//! use bfrun::{compile, Engine};
//!
//! // Classic "Hello World!" in Brainfuck
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let program = compile(code).expect("program should compile");
//! Engine::new().run(&program).expect("program should run");
//! println!(); // ensure a trailing newline for readability
//! ```

pub mod cli_util;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod repl;

pub use compiler::{Command, Program, compile};
pub use engine::{Engine, TAPE_LEN};
pub use error::{BrainfuckError, UnmatchedBracketKind};

/// Compile `source` and run it on a fresh default engine, with program
/// output to stdout and input from stdin.
pub fn compile_and_run(source: &str, strict_cells: bool) -> Result<(), BrainfuckError> {
    let program = compile(source)?;
    let mut engine = Engine::new();
    engine.set_strict_cells(strict_cells);
    engine.run(&program)
}
