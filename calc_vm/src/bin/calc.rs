//! calc command-line interface.
//!
//! Usage:
//!   calc            # interactive REPL, exits on end of input
//!   calc file.calc  # evaluate a file, print its output and final value

use std::env;
use std::fs;
use std::process::ExitCode;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use calc_vm::api::EvalError;
use calc_vm::repl::Session;
use calc_vm::vm::{ErrorKind, Value};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => run_repl(),
        [path] => run_file(path),
        _ => {
            eprintln!("usage: calc [file]");
            ExitCode::FAILURE
        }
    }
}

fn is_no_result(value: &Value) -> bool {
    matches!(value, Value::Error(e) if e.kind == ErrorKind::NoResult)
}

fn run_file(path: &str) -> ExitCode {
    let src = match fs::read_to_string(path) {
        Ok(src) => src,
        Err(err) => {
            eprintln!("calc: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new();
    match session.eval(&src) {
        Ok(value) => {
            print!("{}", session.take_output());
            if !is_no_result(&value) {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            print!("{}", session.take_output());
            println!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_repl() -> ExitCode {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("calc: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut session = Session::new();
    let mut pending = String::new();

    loop {
        let prompt = if pending.is_empty() { "calc> " } else { "  ... " };
        match editor.readline(prompt) {
            Ok(line) => {
                pending.push_str(&line);
                pending.push('\n');
                match session.eval(&pending) {
                    Err(EvalError::Parse(err)) if err.is_incomplete() => continue,
                    Ok(value) => {
                        let _ = editor.add_history_entry(pending.trim_end());
                        pending.clear();
                        print!("{}", session.take_output());
                        println!("{value}");
                    }
                    Err(err) => {
                        let _ = editor.add_history_entry(pending.trim_end());
                        pending.clear();
                        print!("{}", session.take_output());
                        println!("{err}");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                pending.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("calc: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
