use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use dudelang::{Environment, Error, interpret, tokenize};

/// Runs a dudelang program.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Print the token stream before running
    #[arg(long)]
    tokens: bool,

    /// Print the parsed program before running
    #[arg(long)]
    ast: bool,

    /// Source file, must end in .dude
    file: PathBuf,
}

fn has_dude_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "dude")
}

fn main() -> ExitCode {
    // clap exits with status 2 on usage errors
    let cli = Cli::parse();
    let path = cli.file.as_path();
    if !has_dude_extension(path) {
        eprintln!("File extension must be .dude");
        return ExitCode::from(2);
    }
    let name = path.to_string_lossy();

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading '{}': {}", name, e);
            return ExitCode::from(2);
        }
    };

    let tokens = tokenize(&source);
    if cli.tokens {
        println!("Tokens:");
        for token in &tokens {
            println!("  {:?} {:?} [{}]", token.kind, token.text, token.span);
        }
    }

    let result = dudelang::Parser::new(tokens)
        .parse()
        .map_err(Error::from)
        .and_then(|program| {
            if cli.ast {
                println!("AST:");
                for stmt in &program {
                    println!("  {}", stmt);
                }
            }
            let stdout = io::stdout();
            let mut out = stdout.lock();
            interpret(&program, Environment::new(), &mut out).map_err(Error::from)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.pretty_print(&name, &source).is_err() {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
