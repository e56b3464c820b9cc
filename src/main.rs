use anyhow::Result;
use clap::Parser;
use gatefix::{CLIArguments, Cli, evaluate_main, generate_main, repair_main};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        CLIArguments::Evaluate(args) => evaluate_main(args),
        CLIArguments::Repair(args) => repair_main(args),
        CLIArguments::Generate(args) => generate_main(args),
    }
}
