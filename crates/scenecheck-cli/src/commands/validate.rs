//! Validate-config command - load a configuration and report problems.

use std::path::PathBuf;

use colored::Colorize;
use scenecheck::EngineConfig;

pub fn run(file: PathBuf, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let config = EngineConfig::load(&file)?;
    config.validate()?;

    println!(
        "{} {}",
        "Valid".green().bold(),
        file.display().to_string().white()
    );
    println!(
        "  {} fields, {} smoothed, {} check groups (n={}, m={})",
        config.fields.len().to_string().white().bold(),
        config.smoothing.fields.len(),
        config.rule_set.checks.len(),
        config.n,
        config.m
    );

    if verbose {
        println!();
        println!("{}", "Check groups:".yellow().bold());
        for group in &config.rule_set.checks {
            println!("  {:30} {} rules", group.name, group.rules.len());
        }
    }

    Ok(())
}
