//! A plain-stdin Brainfuck REPL.
//!
//! Reads a submission until EOF, keeps only the eight command characters,
//! then compiles and runs it on a fresh engine so consecutive submissions
//! never share tape state.

use std::env;
use std::io::{self, Write};

use crate::{cli_util, compile_and_run};

pub fn repl_loop() -> io::Result<()> {
    loop {
        let mut stdin = io::stdin().lock();

        print!("bf> ");
        io::stdout().flush()?;

        let submission = read_submission(&mut stdin);
        let Some(submission) = submission else {
            // EOF or empty input
            println!();
            io::stdout().flush()?;
            return Ok(());
        };

        let trimmed = submission.trim();
        if trimmed.is_empty() {
            continue;
        }

        let filtered = bf_only(trimmed);
        if filtered.is_empty() {
            continue;
        }

        execute_buffer(&filtered);

        // Test hook: if BF_REPL_ONCE is set, exit after a single execution
        // to allow integration testing
        if env::var("BF_REPL_ONCE").ok().as_deref() == Some("1") {
            return Ok(());
        }
    }
}

/// Compiles and runs a single Brainfuck program contained in `buffer`.
/// - Program output goes to stdout.
/// - Errors are printed concisely to stderr.
/// - A newline is always written to stdout after execution (success or
///   error) so that the prompt begins at column 0 on the next iteration.
fn execute_buffer(buffer: &str) {
    // Fresh engine per submission: each execution starts with a zeroed
    // tape and reset pointers.
    if let Err(err) = compile_and_run(buffer, false) {
        cli_util::print_error(None, buffer, &err);
        let _ = io::stderr().flush();
    }
    println!();
    let _ = io::stdout().flush();
}

fn read_submission<R: io::BufRead>(stdin: &mut R) -> Option<String> {
    // Collect all lines until EOF
    let mut buffer = String::new();

    loop {
        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => {
                // EOF
                break;
            }
            Ok(_) => {
                buffer.push_str(&line);
            }
            Err(_) => {
                // Read error, ignore
                return None;
            }
        }
    }

    if buffer.is_empty() { None } else { Some(buffer) }
}

/// Keep only Brainfuck instruction characters
fn bf_only(s: &str) -> String {
    s.chars()
        .filter(|c| matches!(c, '>' | '<' | '+' | '-' | '.' | ',' | '[' | ']'))
        .collect()
}
