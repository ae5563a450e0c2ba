//! Monkey CLI: execute files, evaluate one-liners, or run the REPL.

use std::env;
use std::fs;
use std::process;

use monkey_lang::repl::Repl;
use monkey_lang::{code, compile_source, run_source};

/// CLI command to execute.
enum Command {
    /// Start the REPL.
    Repl,
    /// Run a script file.
    Run { file: String },
    /// Evaluate a string and print the result.
    Eval { code: String },
}

struct Options {
    command: Command,
    disassemble: bool,
}

fn print_usage() {
    eprintln!("Monkey {} - bytecode compiler and VM", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: monkey [options] [script.monkey]");
    eprintln!("       monkey run <script.monkey>");
    eprintln!("       monkey eval <code>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --disassemble  Print compiled bytecode before running");
    eprintln!("  -h, --help     Show this help");
    eprintln!();
    eprintln!("With no script, an interactive REPL is started.");
}

fn parse_args() -> Options {
    let mut disassemble = false;
    let mut positional: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--disassemble" => disassemble = true,
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            _ if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                print_usage();
                process::exit(2);
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.first().map(String::as_str) {
        None => Command::Repl,
        Some("run") => match positional.get(1) {
            Some(file) => Command::Run { file: file.clone() },
            None => {
                eprintln!("Usage: monkey run <script.monkey>");
                process::exit(2);
            }
        },
        Some("eval") => match positional.get(1) {
            Some(code) => Command::Eval { code: code.clone() },
            None => {
                eprintln!("Usage: monkey eval <code>");
                process::exit(2);
            }
        },
        Some(file) => Command::Run {
            file: file.to_string(),
        },
    };

    Options {
        command,
        disassemble,
    }
}

fn main() {
    let options = parse_args();

    match options.command {
        Command::Repl => Repl::new().run(),
        Command::Run { file } => {
            let source = match fs::read_to_string(&file) {
                Ok(source) => source,
                Err(err) => {
                    eprintln!("Could not read {}: {}", file, err);
                    process::exit(1);
                }
            };
            execute(&source, options.disassemble, false);
        }
        Command::Eval { code } => execute(&code, options.disassemble, true),
    }
}

fn execute(source: &str, disassemble: bool, print_result: bool) {
    if disassemble {
        match compile_source(source) {
            Ok(bytecode) => {
                print!("{}", code::disassemble(&bytecode.instructions));
                println!("---");
            }
            Err(err) => {
                eprintln!("{}", err);
                process::exit(1);
            }
        }
    }

    match run_source(source) {
        Ok(result) => {
            if print_result {
                println!("{}", result);
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}
