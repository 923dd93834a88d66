//! MiniC front end - lex and parse a source file
//!
//! Usage: minic [OPTIONS] <input>

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use codespan_reporting::term::termcolor::ColorChoice;
use minic::common::DiagnosticReporter;
use minic::driver::{DriverConfig, Pipeline};

/// When to color diagnostics
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Color {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> Self {
        match color {
            Color::Auto => ColorChoice::Auto,
            Color::Always => ColorChoice::Always,
            Color::Never => ColorChoice::Never,
        }
    }
}

#[derive(ClapParser, Debug)]
#[command(name = "minic")]
#[command(author = "MiniC Team")]
#[command(version)]
#[command(about = "Lexer and parser for a small C-like language", long_about = None)]
struct Args {
    /// Input source file
    #[arg(required = true)]
    input: PathBuf,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Diagnostic coloring
    #[arg(long, value_enum, default_value = "auto")]
    color: Color,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<i32> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::with_color(args.color.into());
    let file_id = reporter.add_file(&filename, &source);

    if args.verbose {
        eprintln!("Parsing {filename} ({} bytes)", source.len());
    }

    let config = DriverConfig {
        dump_tokens: args.dump_tokens,
        dump_ast: args.dump_ast,
        verbose: args.verbose,
    };
    let outcome = Pipeline::new(config, &reporter, file_id).run(&source);

    println!("{}", outcome.summary());
    Ok(outcome.exit_code())
}
