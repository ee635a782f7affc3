//! Config command - write the built-in configuration.

use std::path::PathBuf;

use colored::Colorize;
use scenecheck::EngineConfig;

pub fn run(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::odd_defaults();

    match output {
        Some(path) => {
            config.save(&path)?;
            println!("{} {}", "Saved config to".green().bold(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}
