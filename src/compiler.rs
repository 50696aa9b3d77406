//! Compiles Brainfuck source text into a run-length folded command sequence.
//!
//! The compiler makes a single left-to-right scan over the source. Runs of
//! identical unit commands collapse into one counted command, and loop
//! brackets are resolved to sequence indices with an explicit stack, so the
//! engine never re-scans the text at runtime. Characters outside the eight
//! command symbols are comments and are skipped.

use crate::error::{BrainfuckError, UnmatchedBracketKind};

/// One compiled instruction.
///
/// Increment/Decrement/MoveLeft/MoveRight/Input/Output carry a fold count
/// (always >= 1). LoopBegin/LoopEnd carry the index of the matching bracket
/// command within the compiled sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Increment(usize),
    Decrement(usize),
    MoveLeft(usize),
    MoveRight(usize),
    Input(usize),
    Output(usize),
    LoopBegin(usize),
    LoopEnd(usize),
    SetZero,
}

/// A compiled program: an ordered command sequence, immutable after
/// compilation. Every LoopBegin's target is the index of its matching
/// LoopEnd and vice versa; both are set together when the `]` is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    commands: Vec<Command>,
}

impl Program {
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Placeholder target for a LoopBegin whose `]` has not been scanned yet.
/// Always patched before `compile` returns.
const UNRESOLVED: usize = usize::MAX;

/// Compile `source` into a [`Program`].
///
/// O(len) time and space, and deterministic: identical text always yields a
/// structurally identical sequence. Fails with
/// [`BrainfuckError::UnmatchedBrackets`] on a stray `]` (immediately) or an
/// unclosed `[` (at end of scan), carrying the character position of the
/// offending bracket.
pub fn compile(source: &str) -> Result<Program, BrainfuckError> {
    let mut commands: Vec<Command> = Vec::new();
    // Pending '[' entries: (index in `commands`, char position in `source`).
    let mut open: Vec<(usize, usize)> = Vec::new();

    for (pos, ch) in source.chars().enumerate() {
        match ch {
            '[' => {
                open.push((commands.len(), pos));
                commands.push(Command::LoopBegin(UNRESOLVED));
            }
            ']' => {
                let Some((begin, _)) = open.pop() else {
                    return Err(BrainfuckError::UnmatchedBrackets {
                        pos,
                        kind: UnmatchedBracketKind::Close,
                    });
                };
                // `[-]` zeroes the cell one step at a time; emit the direct
                // form instead. Only the single-decrement spelling is
                // rewritten: `[+]` must still trip the strict cell policy
                // at 255, and `[--]` diverges on odd cell values.
                if begin + 2 == commands.len() && commands[begin + 1] == Command::Decrement(1) {
                    commands.truncate(begin);
                    commands.push(Command::SetZero);
                } else {
                    let end = commands.len();
                    commands.push(Command::LoopEnd(begin));
                    commands[begin] = Command::LoopBegin(end);
                }
            }
            '+' => fold(&mut commands, Command::Increment(1)),
            '-' => fold(&mut commands, Command::Decrement(1)),
            '<' => fold(&mut commands, Command::MoveLeft(1)),
            '>' => fold(&mut commands, Command::MoveRight(1)),
            ',' => fold(&mut commands, Command::Input(1)),
            '.' => fold(&mut commands, Command::Output(1)),
            _ => {} // comment
        }
    }

    if let Some(&(_, pos)) = open.last() {
        return Err(BrainfuckError::UnmatchedBrackets {
            pos,
            kind: UnmatchedBracketKind::Open,
        });
    }

    Ok(Program { commands })
}

/// Append `cmd`, or bump the count of the previous command when it is the
/// same operation. Brackets never fold; they always reach the `push` arm.
fn fold(commands: &mut Vec<Command>, cmd: Command) {
    use Command::*;
    match (commands.last_mut(), cmd) {
        (Some(Increment(n)), Increment(_))
        | (Some(Decrement(n)), Decrement(_))
        | (Some(MoveLeft(n)), MoveLeft(_))
        | (Some(MoveRight(n)), MoveRight(_))
        | (Some(Input(n)), Input(_))
        | (Some(Output(n)), Output(_)) => *n += 1,
        _ => commands.push(cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_runs_of_identical_commands() {
        let program = compile("+++>>--..").unwrap();
        assert_eq!(
            program.commands(),
            &[
                Command::Increment(3),
                Command::MoveRight(2),
                Command::Decrement(2),
                Command::Output(2),
            ]
        );
    }

    #[test]
    fn runs_do_not_fold_across_different_commands() {
        let program = compile("+-+").unwrap();
        assert_eq!(
            program.commands(),
            &[
                Command::Increment(1),
                Command::Decrement(1),
                Command::Increment(1),
            ]
        );
    }

    #[test]
    fn non_command_characters_are_comments() {
        let program = compile("add two: + comment +").unwrap();
        assert_eq!(program.commands(), &[Command::Increment(2)]);
    }

    #[test]
    fn brackets_resolve_to_mutually_consistent_targets() {
        let program = compile("+[,-]").unwrap();
        assert_eq!(
            program.commands(),
            &[
                Command::Increment(1),
                Command::LoopBegin(4),
                Command::Input(1),
                Command::Decrement(1),
                Command::LoopEnd(1),
            ]
        );
    }

    #[test]
    fn nested_brackets_resolve_inside_out() {
        let program = compile("[.[,]]").unwrap();
        assert_eq!(
            program.commands(),
            &[
                Command::LoopBegin(5),
                Command::Output(1),
                Command::LoopBegin(4),
                Command::Input(1),
                Command::LoopEnd(2),
                Command::LoopEnd(0),
            ]
        );
    }

    #[test]
    fn stray_close_bracket_fails_immediately() {
        let err = compile("+]").unwrap_err();
        assert!(matches!(
            err,
            BrainfuckError::UnmatchedBrackets {
                pos: 1,
                kind: UnmatchedBracketKind::Close,
            }
        ));
    }

    #[test]
    fn unclosed_open_bracket_fails_at_end_of_scan() {
        let err = compile("+[+").unwrap_err();
        assert!(matches!(
            err,
            BrainfuckError::UnmatchedBrackets {
                pos: 1,
                kind: UnmatchedBracketKind::Open,
            }
        ));
    }

    #[test]
    fn clear_loop_compiles_to_set_zero() {
        let program = compile("+++[-]").unwrap();
        assert_eq!(
            program.commands(),
            &[Command::Increment(3), Command::SetZero]
        );
    }

    #[test]
    fn set_zero_inside_outer_loop_keeps_outer_targets_consistent() {
        let program = compile("[[-]>]").unwrap();
        assert_eq!(
            program.commands(),
            &[
                Command::LoopBegin(3),
                Command::SetZero,
                Command::MoveRight(1),
                Command::LoopEnd(0),
            ]
        );
    }

    #[test]
    fn only_single_decrement_loops_become_set_zero() {
        // `[+]` and `[--]` are not equivalent to SetZero under every
        // policy, so they stay as real loops.
        let plus = compile("[+]").unwrap();
        assert_eq!(
            plus.commands(),
            &[
                Command::LoopBegin(2),
                Command::Increment(1),
                Command::LoopEnd(0),
            ]
        );

        let double = compile("[--]").unwrap();
        assert_eq!(
            double.commands(),
            &[
                Command::LoopBegin(2),
                Command::Decrement(2),
                Command::LoopEnd(0),
            ]
        );
    }

    #[test]
    fn recompiling_identical_source_is_deterministic() {
        let source = "++[>++[-]<-],.";
        assert_eq!(compile(source).unwrap(), compile(source).unwrap());
    }

    #[test]
    fn empty_source_compiles_to_empty_program() {
        let program = compile("").unwrap();
        assert!(program.is_empty());
    }
}
