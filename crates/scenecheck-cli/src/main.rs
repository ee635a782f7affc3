//! Scenecheck CLI - temporal smoothing and consistency checks for
//! driving-scene annotations.

mod cli;
mod commands;
mod logging;

use clap::Parser;
use cli::{Cli, Commands, LogFormatArg};
use logging::{LogConfig, LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();

    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    init_logging(&LogConfig::from_verbosity(cli.verbose).with_format(format));

    let result = match cli.command {
        Commands::Run {
            file,
            config,
            output,
            report,
            n,
            m,
            scene_col,
            order_col,
            require_scenes,
            workers,
        } => commands::run::run(commands::run::RunArgs {
            file,
            config,
            output,
            report,
            n,
            m,
            scene_col,
            order_col,
            require_scenes,
            workers,
            verbose: cli.verbose > 0,
        }),

        Commands::Config { output } => commands::config::run(output),

        Commands::ValidateConfig { file } => commands::validate::run(file, cli.verbose > 0),

        Commands::Summary { file, json } => commands::summary::run(file, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
