//! Command-line interface implementation

use clap::Parser;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::atlas::Atlas;
use crate::output::render;
use crate::parser::parse_atlas;
use crate::query::{navigate, QueryError};

/// Exit codes
const EXIT_SUCCESS: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_INVALID_ARGS: u8 = 2;

/// Atlasq - parse texture atlas descriptions and query the result
#[derive(Parser)]
#[command(name = "atq")]
#[command(about = "Atlasq - parse texture atlas descriptions and query the result")]
#[command(version)]
pub struct Cli {
    /// Atlas file to read (stdin when omitted)
    #[arg(short = 'f', long)]
    pub infile: Option<PathBuf>,

    /// Attribute path to print, e.g. `pages 0 name` or `regions 2 x`.
    /// An empty path prints the whole atlas.
    #[arg(value_name = "ATTR")]
    pub attr: Vec<String>,

    /// Read attribute paths interactively after parsing
    #[arg(short, long)]
    pub interactive: bool,
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let parsed = match &cli.infile {
        Some(path) => {
            let file = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Error: Cannot open input file '{}': {}", path.display(), e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            };
            parse_atlas(BufReader::new(file))
        }
        None => parse_atlas(io::stdin().lock()),
    };

    let atlas = match parsed {
        Ok(atlas) => atlas,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if cli.interactive && atty::is(atty::Stream::Stdout) {
        return run_interactive(&atlas);
    }

    match evaluate(&atlas, &cli.attr) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Navigate an attribute path and pretty-print the result.
fn evaluate<S: AsRef<str>>(atlas: &Atlas, attr: &[S]) -> Result<String, QueryError> {
    let node = navigate(atlas, attr)?;
    let value = render(&node);
    Ok(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
}

/// Query loop: each stdin line is an attribute path, evaluated against
/// the parsed atlas until EOF. Errors are reported and the loop
/// continues.
fn run_interactive(atlas: &Atlas) -> ExitCode {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {
                let segments: Vec<&str> = line.split_whitespace().collect();
                match evaluate(atlas, &segments) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
