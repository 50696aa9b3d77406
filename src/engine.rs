//! The execution engine: owns the tape, data pointer, and program counter,
//! and interprets a compiled [`Program`] to completion or failure.
//!
//! Pointer policy (kept from the original interpreter, documented rather
//! than repaired): movement commands use wrapping arithmetic and never
//! check bounds, so the pointer may drift arbitrarily far off the tape.
//! Cell-mutating commands (`+`, `-`, SetZero) fail with `BufferOverflow`
//! when the pointer is at or beyond the last valid index; cell-reading
//! commands (`.`, `,`, `[`, `]`) fail only when the pointer is off the
//! tape entirely. The last cell is therefore readable but not mutable.
//!
//! Cell policy: mutations wrap modulo 256 by default. With
//! `set_strict_cells(true)`, a fold that would carry a cell past 255 or
//! below 0 fails with `BufferUnderflow` before any of it is applied.
//!
//! Input is raw bytes, one per read; end of stream sets the cell to 0.

use std::io::{self, Read, Write};

use crate::compiler::{Command, Program};
use crate::error::BrainfuckError;

/// Tape length used by [`Engine::new`].
pub const TAPE_LEN: usize = 30000;

/// Interprets compiled programs against a fixed-length tape of `u8` cells.
///
/// Each engine exclusively owns its tape, data pointer, and program
/// counter; nothing is shared between engines, so independent runs are
/// isolated by construction. [`Engine::run`] resets all mutable state
/// first, which makes sequential reuse of one engine safe.
pub struct Engine {
    tape: Vec<u8>,
    pointer: usize,
    pc: usize,
    strict_cells: bool,
    // Optional hooks; when unset, Output writes to stdout and Input reads
    // from stdin.
    output_sink: Option<Box<dyn Fn(&[u8]) + Send + Sync>>,
    input_provider: Option<Box<dyn Fn() -> Option<u8> + Send + Sync>>,
}

impl Engine {
    /// Create an engine with the canonical 30,000-cell tape.
    pub fn new() -> Self {
        Self::with_tape_len(TAPE_LEN)
    }

    /// Create an engine with a custom tape length (mainly for tests).
    pub fn with_tape_len(len: usize) -> Self {
        Self {
            tape: vec![0; len],
            pointer: 0,
            pc: 0,
            strict_cells: false,
            output_sink: None,
            input_provider: None,
        }
    }

    /// When enabled, a cell mutation that would cross the [0, 255]
    /// boundary fails with `BufferUnderflow` instead of wrapping.
    pub fn set_strict_cells(&mut self, strict: bool) {
        self.strict_cells = strict;
    }

    /// Provide an output sink. When set, Output sends bytes here instead of
    /// stdout; the sink receives a single-byte slice per emitted byte.
    pub fn set_output_sink<F>(&mut self, sink: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        self.output_sink = Some(Box::new(sink));
    }

    /// Provide an input provider. When set, Input reads from this provider
    /// instead of stdin. Returning None indicates end of stream (the cell
    /// is set to 0).
    pub fn set_input_provider<F>(&mut self, provider: F)
    where
        F: Fn() -> Option<u8> + Send + Sync + 'static,
    {
        self.input_provider = Some(Box::new(provider));
    }

    /// Zero the tape and reset the data pointer and program counter.
    /// Called at the start of every [`Engine::run`].
    pub fn reset(&mut self) {
        self.tape.fill(0);
        self.pointer = 0;
        self.pc = 0;
    }

    /// Interpret `program` from a fresh state until the program counter
    /// passes the end of the sequence, or until the first failure. Failures
    /// are immediate and terminal; the tape is simply discarded with the
    /// run.
    pub fn run(&mut self, program: &Program) -> Result<(), BrainfuckError> {
        self.reset();
        let commands = program.commands();

        while self.pc < commands.len() {
            match commands[self.pc] {
                Command::MoveRight(n) => {
                    self.pointer = self.pointer.wrapping_add(n);
                }
                Command::MoveLeft(n) => {
                    // Moving left of cell 0 wraps to a huge index; nothing
                    // fails until the tape is next touched.
                    self.pointer = self.pointer.wrapping_sub(n);
                }
                Command::Increment(n) => {
                    self.check_mutable()?;
                    let cell = self.tape[self.pointer];
                    if self.strict_cells && n > (255 - cell) as usize {
                        return Err(self.cell_boundary(cell));
                    }
                    self.tape[self.pointer] = cell.wrapping_add((n % 256) as u8);
                }
                Command::Decrement(n) => {
                    self.check_mutable()?;
                    let cell = self.tape[self.pointer];
                    if self.strict_cells && n > cell as usize {
                        return Err(self.cell_boundary(cell));
                    }
                    self.tape[self.pointer] = cell.wrapping_sub((n % 256) as u8);
                }
                Command::Output(n) => {
                    let byte = self.cell()?;
                    for _ in 0..n {
                        self.emit(byte)?;
                    }
                }
                Command::Input(n) => {
                    // The pointer must be on the tape before any read lands.
                    self.cell()?;
                    for _ in 0..n {
                        let byte = self.read_input()?;
                        // End of stream sets the cell to 0.
                        self.tape[self.pointer] = byte.unwrap_or(0);
                    }
                }
                Command::LoopBegin(end) => {
                    if self.cell()? == 0 {
                        // Jump to the matching LoopEnd; the normal advance
                        // below then steps past it.
                        self.pc = end;
                    }
                }
                Command::LoopEnd(begin) => {
                    if self.cell()? != 0 {
                        self.pc = begin;
                    }
                }
                Command::SetZero => {
                    // Stands in for `[-]`: a zero cell is only read, never
                    // written, so the stricter mutation check applies only
                    // when there is something to clear.
                    if self.cell()? != 0 {
                        self.check_mutable()?;
                        self.tape[self.pointer] = 0;
                    }
                }
            }
            self.pc += 1;
        }

        Ok(())
    }

    /// Read the current cell. Fails when the pointer is off the tape.
    fn cell(&self) -> Result<u8, BrainfuckError> {
        if self.pointer >= self.tape.len() {
            return Err(BrainfuckError::BufferOverflow {
                pc: self.pc,
                ptr: self.pointer,
            });
        }
        Ok(self.tape[self.pointer])
    }

    /// Mutation bound check: the pointer must be strictly below the last
    /// valid index (the original's check direction, applied at mutation
    /// time rather than at move time).
    fn check_mutable(&self) -> Result<(), BrainfuckError> {
        if self.pointer >= self.tape.len().saturating_sub(1) {
            return Err(BrainfuckError::BufferOverflow {
                pc: self.pc,
                ptr: self.pointer,
            });
        }
        Ok(())
    }

    fn cell_boundary(&self, cell: u8) -> BrainfuckError {
        BrainfuckError::BufferUnderflow {
            pc: self.pc,
            ptr: self.pointer,
            cell,
        }
    }

    fn emit(&self, byte: u8) -> Result<(), BrainfuckError> {
        if let Some(sink) = self.output_sink.as_ref() {
            sink(&[byte]);
            return Ok(());
        }
        io::stdout()
            .write_all(&[byte])
            .map_err(|source| BrainfuckError::Io {
                pc: self.pc,
                source,
            })
    }

    /// One raw byte from the provider or stdin; None means end of stream.
    fn read_input(&self) -> Result<Option<u8>, BrainfuckError> {
        if let Some(provider) = self.input_provider.as_ref() {
            return Ok(provider());
        }
        let mut buf = [0u8; 1];
        match io::stdin().read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(source) => Err(BrainfuckError::Io {
                pc: self.pc,
                source,
            }),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use std::sync::{Arc, Mutex};

    fn run_with_output(engine: &mut Engine, source: &str) -> (Result<(), BrainfuckError>, Vec<u8>) {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);
        engine.set_output_sink(move |bytes| sink.lock().unwrap().extend_from_slice(bytes));
        let result = engine.run(&compile(source).unwrap());
        let bytes = captured.lock().unwrap().clone();
        (result, bytes)
    }

    #[test]
    fn wrapping_addition() {
        let code = "+".repeat(256); // 256 increments should wrap around
        let mut engine = Engine::with_tape_len(10);
        engine.run(&compile(&code).unwrap()).unwrap();
        assert_eq!(engine.tape[0], 0);
    }

    #[test]
    fn wrapping_subtraction() {
        let mut engine = Engine::with_tape_len(10);
        engine.run(&compile("-").unwrap()).unwrap();
        assert_eq!(engine.tape[0], 255);
    }

    #[test]
    fn strict_cells_fail_on_the_wrapping_increment() {
        let code = "+".repeat(256);
        let mut engine = Engine::with_tape_len(10);
        engine.set_strict_cells(true);
        let result = engine.run(&compile(&code).unwrap());
        assert!(matches!(
            result,
            Err(BrainfuckError::BufferUnderflow { cell: 0, .. })
        ));
        // The whole fold is rejected before any of it is applied.
        assert_eq!(engine.tape[0], 0);
    }

    #[test]
    fn strict_cells_allow_up_to_255() {
        let code = "+".repeat(255);
        let mut engine = Engine::with_tape_len(10);
        engine.set_strict_cells(true);
        engine.run(&compile(&code).unwrap()).unwrap();
        assert_eq!(engine.tape[0], 255);
    }

    #[test]
    fn strict_cells_fail_on_decrement_below_zero() {
        let mut engine = Engine::with_tape_len(10);
        engine.set_strict_cells(true);
        let result = engine.run(&compile("-").unwrap());
        assert!(matches!(
            result,
            Err(BrainfuckError::BufferUnderflow { cell: 0, .. })
        ));
    }

    #[test]
    fn clear_loop_zeroes_the_cell() {
        // `[-]` compiles to SetZero; `[--]` runs as a real loop. Both must
        // leave an even cell at zero.
        for source in ["+++[-]", "++++[--]"] {
            let mut engine = Engine::with_tape_len(10);
            engine.run(&compile(source).unwrap()).unwrap();
            assert_eq!(engine.tape[0], 0, "source {source:?}");
        }
    }

    #[test]
    fn movement_alone_is_never_checked() {
        let mut engine = Engine::with_tape_len(3);
        engine.run(&compile(">>>>>").unwrap()).unwrap();
        // Left of cell 0 just wraps the pointer; still no failure.
        engine.run(&compile("<").unwrap()).unwrap();
    }

    #[test]
    fn mutation_after_drifting_off_the_tape_overflows() {
        let mut engine = Engine::with_tape_len(3);
        let result = engine.run(&compile(">>>+").unwrap());
        assert!(matches!(
            result,
            Err(BrainfuckError::BufferOverflow { ptr: 3, .. })
        ));
    }

    #[test]
    fn mutation_after_wrapping_left_overflows() {
        let mut engine = Engine::with_tape_len(3);
        let result = engine.run(&compile("<+").unwrap());
        assert!(matches!(result, Err(BrainfuckError::BufferOverflow { .. })));
    }

    #[test]
    fn last_cell_is_readable_but_not_mutable() {
        let mut engine = Engine::with_tape_len(3);
        let result = engine.run(&compile(">>+").unwrap());
        assert!(matches!(
            result,
            Err(BrainfuckError::BufferOverflow { ptr: 2, .. })
        ));

        let (result, bytes) = run_with_output(&mut Engine::with_tape_len(3), ">>.");
        result.unwrap();
        assert_eq!(bytes, [0]);
    }

    #[test]
    fn output_emits_one_byte_per_fold_count() {
        let (result, bytes) = run_with_output(&mut Engine::with_tape_len(10), "+++..");
        result.unwrap();
        assert_eq!(bytes, [3, 3]);
    }

    #[test]
    fn input_reads_raw_bytes_last_one_wins() {
        let inputs = Arc::new(Mutex::new(vec![b'a', b'b'].into_iter()));
        let mut engine = Engine::with_tape_len(10);
        let provider = Arc::clone(&inputs);
        engine.set_input_provider(move || provider.lock().unwrap().next());
        engine.run(&compile(",,").unwrap()).unwrap();
        assert_eq!(engine.tape[0], b'b');
    }

    #[test]
    fn input_at_end_of_stream_sets_cell_to_zero() {
        let mut engine = Engine::with_tape_len(10);
        engine.set_input_provider(|| None);
        engine.run(&compile("+++,").unwrap()).unwrap();
        assert_eq!(engine.tape[0], 0);
    }

    #[test]
    fn loop_copies_with_multiplication() {
        // ++[>+++<-] leaves 2 * 3 in cell 1.
        let mut engine = Engine::with_tape_len(10);
        engine.run(&compile("++[>+++<-]").unwrap()).unwrap();
        assert_eq!(engine.tape[0], 0);
        assert_eq!(engine.tape[1], 6);
    }

    #[test]
    fn skipped_loop_body_never_executes() {
        let (result, bytes) = run_with_output(&mut Engine::with_tape_len(10), "[.+]");
        result.unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn run_resets_state_between_uses() {
        let mut engine = Engine::with_tape_len(10);
        let program = compile(">+").unwrap();
        engine.run(&program).unwrap();
        engine.run(&program).unwrap();
        assert_eq!(engine.tape[1], 1);
    }

    #[test]
    fn empty_program_succeeds() {
        let mut engine = Engine::with_tape_len(10);
        engine.run(&compile("").unwrap()).unwrap();
    }
}
