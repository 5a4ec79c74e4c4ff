use clap::Parser;
use ferret::{HtmlDocument, Registry, compile};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

/// Run a path-query expression against an HTML file.
#[derive(Parser)]
#[command(name = "ferret", version, about)]
struct Args {
    /// HTML file to load
    file: PathBuf,

    /// Path expression, e.g. //a/@href
    expression: String,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let html = match fs::read_to_string(&args.file) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("ferret: cannot read {}: {}", args.file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let expression = match compile(&args.expression) {
        Ok(expression) => expression,
        Err(e) => {
            eprintln!("ferret: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let document = HtmlDocument::parse(&html);
    let registry = Registry::new();
    match expression.evaluate(&[document.root()], &registry) {
        Ok(results) => {
            log::debug!("{} results for '{}'", results.len(), expression);
            for result in results {
                println!("{}", result);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("ferret: {}", e);
            ExitCode::FAILURE
        }
    }
}
