use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "minisig")]
#[command(about = "Minisign-compatible file signing and verification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key pair
    Generate(commands::generate::GenerateArgs),
    /// Sign files with a secret key
    Sign(commands::sign::SignArgs),
    /// Verify a file against a detached signature
    Verify(commands::verify::VerifyArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(&args),
        Commands::Sign(args) => commands::sign::run(&args),
        Commands::Verify(args) => commands::verify::run(&args),
    };

    if let Err(e) = result {
        eprintln!("minisig: {e}");
        std::process::exit(1);
    }
}
