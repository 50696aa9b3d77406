use bfrun::error::BrainfuckError;
use bfrun::{Engine, cli_util, compile, repl};
use clap::{Args, Parser, Subcommand};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--strict-cells] "<code>"      # Run Brainfuck code (args are concatenated)
  {0} run [--strict-cells] --file <PATH> # Run Brainfuck code loaded from file
  {0} repl                               # Start a Brainfuck REPL (read-eval-print loop)

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

fn run_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [--strict-cells] "<code>"
  {0} run [--strict-cells] --file <PATH>

Options:
  --file,  -f <PATH>  Read Brainfuck code from PATH instead of positional "<code>"
  --strict-cells      Report a cell crossing the [0, 255] boundary as an error
                      instead of wrapping silently
  --help,  -h   Show this help

Notes:
- Characters outside of Brainfuck's ><+-.,[] are comments and are skipped.
- Input (`,`) reads a single raw byte from stdin; on EOF the current cell is
  set to 0.
- Exit codes: 0 success, 1 buffer overflow, 2 buffer underflow,
  3 unmatched brackets, 4 I/O error, 5 unreadable source.

Examples:
- Load Brainfuck code from a file:
    {0} run --file ./program.bf
- Read bytes from a file as stdin (`,` will consume file input):
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

fn repl_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} repl   # Start a Brainfuck REPL (read-eval-print loop)

Options:
  --help,   -h        Show this help

Description:
  Starts a REPL where you can enter Brainfuck code and execute it live.

Notes:
    - Ctrl+d executes the current buffer on *nix/macOS.
    - Ctrl+z and Enter will execute the current buffer on Windows.
    - Ctrl+c exits the REPL immediately.
    - The REPL will print a newline after each execution for readability.
    - Each execution compiles and runs on a fresh engine (zeroed tape).
    - The REPL will exit after a single execution if the environment variable `BF_REPL_ONCE` is set to `1`.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bfrun", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Repl(ReplArgs),
}

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
struct RunArgs {
    /// Report a cell crossing the [0, 255] boundary as an error instead of
    /// wrapping silently
    #[arg(long = "strict-cells")]
    strict_cells: bool,

    /// Read Brainfuck code from PATH instead of positional "<code>"
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Concatenated Brainfuck code parts
    #[arg(value_name = "code", trailing_var_arg = true)]
    code: Vec<String>,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
struct ReplArgs {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,
}

fn run_run_with_args(program: &str, args: RunArgs) -> i32 {
    if args.help {
        run_usage_and_exit(program, 0);
    }

    let RunArgs {
        strict_cells,
        file,
        code,
        ..
    } = args;

    if file.is_none() && code.is_empty() {
        run_usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        run_usage_and_exit(program, 2);
    }

    let source = if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(source) => {
                let err = BrainfuckError::SourceUnavailable { path, source };
                cli_util::print_error(Some(program), "", &err);
                return err.exit_code();
            }
        }
    } else {
        code.join("")
    };

    let result = compile(&source).and_then(|compiled| {
        let mut engine = Engine::new();
        engine.set_strict_cells(strict_cells);
        engine.run(&compiled)
    });

    if let Err(err) = result {
        cli_util::print_error(Some(program), &source, &err);
        return err.exit_code();
    }

    // For readability, ensure output ends with a newline
    println!();
    let _ = io::stdout().flush();
    0
}

fn run_repl_with_args(program: &str, args: ReplArgs) -> i32 {
    if args.help {
        repl_usage_and_exit(program, 0);
    }

    // Install SIGINT (ctrl+c) handler to flush and exit(0) immediately
    if let Err(e) = ctrlc::set_handler(|| {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
        std::process::exit(0);
    }) {
        eprintln!("{program}: failed to set ctrl+c handler: {e}");
        let _ = io::stderr().flush();
        return 1;
    }

    println!("Brainfuck REPL");
    println!("Ctrl+d/Ctrl+z Enter (Windows) executes the current buffer. Press ctrl+c to exit");

    if let Err(e) = repl::repl_loop() {
        eprintln!("{program}: repl failed: {e}");
        let _ = io::stderr().flush();
        return 1;
    }
    0
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfrun"));

    let cli = Cli::parse();

    if cli.help || cli.command.is_none() {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    }

    let code = match cli.command.unwrap() {
        Command::Run(args) => run_run_with_args(&program, args),
        Command::Repl(args) => run_repl_with_args(&program, args),
    };

    std::process::exit(code);
}
