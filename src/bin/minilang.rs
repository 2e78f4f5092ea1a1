use std::process::ExitCode;

use clap::{Parser, Subcommand};

use minilang::{
    runtime::DEFAULT_MAX_RECURSION_DEPTH, value::StackDisplay, Interpreter, MinilangError,
    RuntimeOptions,
};

#[derive(Parser)]
#[command(author, version, about = "Stack-oriented scripting language")]
struct Args {
    /// Ceiling on nested identifier resolutions
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RECURSION_DEPTH)]
    max_recursion_depth: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a snippet and print the final stack
    Eval { source: String },
    /// Print the tokens of a snippet, one per line
    Tokens { source: String },
    /// Print the syntax tree of a snippet
    Ast { source: String },
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), MinilangError> {
    match args.command {
        Command::Eval { source } => {
            let options = RuntimeOptions {
                max_recursion_depth: args.max_recursion_depth,
            };
            let mut interpreter = Interpreter::with_options(options);
            let stack = interpreter.eval_source(&source)?;
            println!("{}", StackDisplay(stack));
        }
        Command::Tokens { source } => {
            for token in minilang::tokenize(&source)? {
                println!(
                    "{}..{}\t{}",
                    token.span.start, token.span.end, token.kind
                );
            }
        }
        Command::Ast { source } => {
            let program = minilang::parse_program(&source)?;
            println!("{program:#?}");
        }
    }
    Ok(())
}

/// Installs a stderr subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=minilang=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(EnvFilter::from_default_env())
            .init();
    }
}
