//! `inkguard`: sanitize a rich-text fragment from a file or stdin.
//!
//! Exit status is 0 when the input was accepted (sanitized markup on
//! stdout), 1 when it was rejected (one `Code: message` line per error on
//! stderr) and 2 for usage, I/O or configuration problems.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mimalloc::MiMalloc;
use sanitizer::{Mode, Sanitizer, SanitizerConfig};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "inkguard", version, about = "Whitelisting sanitizer for user-authored rich text")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Treat input as plain text and reflow it into paragraphs first
    #[arg(long)]
    raw: bool,

    /// Allow links to hosts other than the internal one
    #[arg(long)]
    allow_external: bool,

    /// Print the result as a JSON object
    #[arg(long)]
    json: bool,

    /// Input file (stdin when omitted)
    input: Option<PathBuf>,
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn build_sanitizer(cli: &Cli) -> Result<Sanitizer, sanitizer::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => SanitizerConfig::from_path(path)?,
        None => SanitizerConfig::default(),
    };
    if cli.allow_external {
        config.allow_external_links = true;
    }
    Sanitizer::new(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let sanitizer = match build_sanitizer(&cli) {
        Ok(sanitizer) => sanitizer,
        Err(err) => {
            eprintln!("inkguard: {err}");
            return ExitCode::from(2);
        }
    };
    let input = match read_input(cli.input.as_ref()) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("inkguard: failed to read input: {err}");
            return ExitCode::from(2);
        }
    };
    log::debug!(target: "inkguard", "read {} bytes", input.len());

    let mode = if cli.raw { Mode::Raw } else { Mode::Html };
    match sanitizer.sanitize_mode(&input, mode) {
        Ok(html) => {
            if cli.json {
                println!("{}", serde_json::json!({ "html": html }));
            } else {
                println!("{html}");
            }
            ExitCode::SUCCESS
        }
        Err(rejected) => {
            if cli.json {
                println!("{}", serde_json::json!({ "errors": rejected.errors }));
            } else {
                eprintln!("{}", rejected.errors);
            }
            ExitCode::from(1)
        }
    }
}
