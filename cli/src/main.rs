use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use conforma_core::{ValidateOptions, Validator, ValidatorError};
use conforma_loader::FileLoader;

#[derive(Debug, Parser)]
#[command(name = "conforma")]
#[command(about = "Validate JSON documents against Draft 3 JSON Schemas")]
struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate one or more instance files against a schema.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Schema file path or URI.
    #[arg(long)]
    schema: String,

    /// Instance files to validate.
    #[arg(required = true)]
    instances: Vec<PathBuf>,

    /// Treat each instance as a list whose items are validated individually.
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    match cli.command {
        Command::Check(args) => run_check(&args),
    }
}

fn run_check(args: &CheckArgs) -> ExitCode {
    let mut validator = Validator::with_loader(Box::new(FileLoader::new()));
    // The schema stays registered across instances; one fetch serves all.
    validator.set_cache_persistence(true);
    let options = ValidateOptions { list: args.list };

    let mut violations = 0usize;
    for instance_path in &args.instances {
        let text = match std::fs::read_to_string(instance_path) {
            Ok(text) => text,
            Err(error) => {
                eprintln!("error: cannot read {}: {error}", instance_path.display());
                return ExitCode::from(2);
            }
        };

        match validator.validate_strict(args.schema.as_str(), text, &options) {
            Ok(()) => println!("{}: ok", instance_path.display()),
            Err(ValidatorError::Validation { message, path, .. }) => {
                violations += 1;
                println!("{}: {message} (at {path})", instance_path.display());
            }
            Err(error) => {
                eprintln!("error: {error}");
                return ExitCode::from(2);
            }
        }
    }

    if violations == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
