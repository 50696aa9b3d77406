use std::fmt;
use std::path::PathBuf;

/// Errors that can occur while compiling or executing Brainfuck code.
///
/// Compile-time failures carry a character position into the source text;
/// runtime failures carry the program counter into the compiled sequence
/// (after run-length folding, not a source position).
#[derive(Debug, thiserror::Error)]
pub enum BrainfuckError {
    /// Loops were not balanced; a matching `[` or `]` was not found.
    #[error("Unmatched bracket {kind} at position {pos}")]
    UnmatchedBrackets { pos: usize, kind: UnmatchedBracketKind },

    /// The data pointer was out of range when a command touched the tape.
    #[error("Buffer overflow at command {pc} (ptr={ptr})")]
    BufferOverflow { pc: usize, ptr: usize },

    /// A cell mutation would cross the [0, 255] boundary while the strict
    /// cell policy is enabled. The historical name is kept even though the
    /// crossing can be in either direction.
    #[error("Buffer underflow at command {pc} (ptr={ptr}, cell={cell})")]
    BufferUnderflow { pc: usize, ptr: usize, cell: u8 },

    /// An underlying I/O error occurred on the input or output stream.
    #[error("I/O error at command {pc}: {source}")]
    Io {
        pc: usize,
        #[source]
        source: std::io::Error,
    },

    /// The program text could not be loaded. Produced by the CLI, never by
    /// the compiler or the engine.
    #[error("Cannot read source {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BrainfuckError {
    /// Process exit code for this failure. Success is 0; the first three
    /// values match the original interpreter's result codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            BrainfuckError::BufferOverflow { .. } => 1,
            BrainfuckError::BufferUnderflow { .. } => 2,
            BrainfuckError::UnmatchedBrackets { .. } => 3,
            BrainfuckError::Io { .. } => 4,
            BrainfuckError::SourceUnavailable { .. } => 5,
        }
    }
}

/// Which side of the loop was unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracketKind {
    Open,
    Close,
}

impl fmt::Display for UnmatchedBracketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracketKind::Open => write!(f, "'['"),
            UnmatchedBracketKind::Close => write!(f, "']'"),
        }
    }
}
