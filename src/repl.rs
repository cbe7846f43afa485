use crate::ast::Program;
use crate::error::ParseError;
use crate::interpreter::{Config, Interpreter};
use crate::parser::Parser;
use std::io::{self, Write};

/// Interactive loop. Lines are buffered until they form complete programs,
/// then each program runs with a fresh environment.
pub fn start(config: Config) {
    println!("blocklang interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+C to quit");
    println!();

    let mut buffer = String::new();

    loop {
        print!("{}", if buffer.is_empty() { "> " } else { ".. " });
        if let Err(error) = io::stdout().flush() {
            eprintln!("Error writing prompt: {}", error);
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if buffer.is_empty() {
                    if trimmed.is_empty() {
                        continue;
                    }
                    if trimmed == "exit" || trimmed == "quit" {
                        println!("Goodbye!");
                        break;
                    }
                }

                buffer.push_str(&line);
                if run_repl_input(&buffer, config) {
                    buffer.clear();
                }
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Input {
    Complete(Vec<Program>),
    Incomplete,
}

/// A parse error at the end of the buffered text means more lines are
/// needed; any other parse error is final.
fn classify(source: &str) -> Result<Input, ParseError> {
    match Parser::new(source).parse() {
        Ok(programs) => Ok(Input::Complete(programs)),
        Err(error) if error.is_at_end_of_input() => Ok(Input::Incomplete),
        Err(error) => Err(error),
    }
}

/// Returns whether the buffer was consumed.
fn run_repl_input(source: &str, config: Config) -> bool {
    let programs = match classify(source) {
        Ok(Input::Complete(programs)) => programs,
        Ok(Input::Incomplete) => return false,
        Err(error) => {
            error.report(source, None);
            return true;
        }
    };

    let stdout = io::stdout();
    let mut interpreter = Interpreter::new(config, stdout.lock());
    if let Err(error) = interpreter.run_programs(&programs) {
        eprintln!("Error: {}", error);
    }
    true
}
