//! pseudoc-drv - Interpreter Driver
//!
//! Entry point and orchestrator for the pipeline. The driver is
//! responsible for:
//!
//! 1. Argument handling: one positional source path plus debug flags.
//! 2. File loading: the path must end in `.pseudo` and be valid UTF-8.
//! 3. Phase orchestration: lex → parse → run, stopping at the first error.
//! 4. Error reporting: one line on stderr, non-zero exit.
//!
//! Debug flags follow the emit-and-stop style: `--emit-tokens` prints the
//! token stream instead of running, `--emit-ast` the parsed tree;
//! `--verbose` traces phase progress on stderr.

use std::fs;
use std::path::PathBuf;

use thiserror::Error;

use pseudoc_eval::io::{StdinReader, StdoutWriter};
use pseudoc_eval::RuntimeError;
use pseudoc_lex::LexError;
use pseudoc_par::ParseError;

/// What the driver produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitType {
    /// Print the token stream and stop.
    Tokens,
    /// Print the parsed AST and stop.
    Ast,
    /// Execute the program.
    #[default]
    Run,
}

/// Driver configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the `.pseudo` source file.
    pub path: PathBuf,

    /// What to produce.
    pub emit: EmitType,

    /// Trace phase progress on stderr.
    pub verbose: bool,
}

/// Error surfaced by the driver; each variant prints as the one-line
/// message the user sees.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Wrong number of positional arguments or an unknown flag.
    #[error("Usage: pseudoc <filename>")]
    Usage,

    /// The source path does not end in `.pseudo`.
    #[error("source file must have a .pseudo extension: {0}")]
    Extension(String),

    /// The source file could not be read.
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Config {
    /// Builds a configuration from the command-line arguments (program name
    /// excluded).
    pub fn from_args(args: &[String]) -> Result<Config, DriverError> {
        let mut path = None;
        let mut emit = EmitType::default();
        let mut verbose = false;

        for arg in args {
            match arg.as_str() {
                "--emit-tokens" => emit = EmitType::Tokens,
                "--emit-ast" => emit = EmitType::Ast,
                "--verbose" => verbose = true,
                flag if flag.starts_with("--") => return Err(DriverError::Usage),
                positional => {
                    if path.is_some() {
                        return Err(DriverError::Usage);
                    }
                    path = Some(PathBuf::from(positional));
                }
            }
        }

        let path = path.ok_or(DriverError::Usage)?;
        if path.extension().is_none_or(|ext| ext != "pseudo") {
            return Err(DriverError::Extension(path.display().to_string()));
        }

        Ok(Config {
            path,
            emit,
            verbose,
        })
    }
}

/// Runs one driver invocation: load, lex, parse, then execute (or emit the
/// requested intermediate form).
pub fn run(config: &Config) -> Result<(), DriverError> {
    if config.verbose {
        eprintln!("Reading {}", config.path.display());
    }
    let source = fs::read_to_string(&config.path).map_err(|source| DriverError::Io {
        path: config.path.display().to_string(),
        source,
    })?;

    if config.verbose {
        eprintln!("Lexing {}", config.path.display());
    }
    let tokens = pseudoc_lex::lex(&source)?;
    if config.emit == EmitType::Tokens {
        for token in &tokens {
            println!("{}:{} {:?}", token.line, token.column, token.kind);
        }
        return Ok(());
    }

    if config.verbose {
        eprintln!("Parsing {}", config.path.display());
    }
    let program = pseudoc_par::parse(tokens)?;
    if config.emit == EmitType::Ast {
        println!("{program:#?}");
        return Ok(());
    }

    if config.verbose {
        eprintln!("Running {}", config.path.display());
    }
    let mut input = StdinReader;
    let mut output = StdoutWriter;
    pseudoc_eval::run(&program, &mut input, &mut output)?;
    Ok(())
}
