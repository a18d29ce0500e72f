use clap::Parser;
use connectome_cli::{cli::Cli, config};
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> connectome_cli::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration, CLI override winning over config files
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(script) = cli.fsl_init {
        config.fsl.init_script = script;
    }

    // Execute command
    connectome_cli::run_command(cli.command, &config)
}
