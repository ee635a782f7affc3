//! Run command - normalize, smooth and check an annotation file.

use std::path::{Path, PathBuf};

use colored::Colorize;
use scenecheck::{Engine, EngineConfig, write_table};

use super::summary::print_report;

/// Arguments for the run command.
pub struct RunArgs {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub n: Option<usize>,
    pub m: Option<usize>,
    pub scene_col: Option<String>,
    pub order_col: Option<String>,
    pub require_scenes: bool,
    pub workers: Option<usize>,
    pub verbose: bool,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::odd_defaults(),
    };
    apply_overrides(&mut config, &args);

    println!(
        "{} {}",
        "Checking".cyan().bold(),
        args.file.display().to_string().white()
    );
    if args.verbose {
        println!(
            "  thresholds n={} m={}, scene column '{}', {} worker(s)",
            config.n, config.m, config.scene_col, config.workers
        );
    }

    let engine = Engine::new(config)?;
    let output = engine.run_file(&args.file)?;

    let table_path = args
        .output
        .unwrap_or_else(|| sibling_path(&args.file, "checked", extension(&args.file)));
    let report_path = args
        .report
        .unwrap_or_else(|| sibling_path(&args.file, "report", "json"));

    write_table(&output.table, &table_path, None)?;
    output.report.save(&report_path)?;

    println!();
    print_report(&output.report);
    println!();
    println!(
        "{} {}",
        "Saved table to".green().bold(),
        table_path.display()
    );
    println!(
        "{} {}",
        "Saved report to".green().bold(),
        report_path.display()
    );

    Ok(())
}

fn apply_overrides(config: &mut EngineConfig, args: &RunArgs) {
    if let Some(n) = args.n {
        config.n = n;
    }
    if let Some(m) = args.m {
        config.m = m;
    }
    if let Some(scene_col) = &args.scene_col {
        config.scene_col = scene_col.clone();
    }
    if let Some(order_col) = &args.order_col {
        config.order_col = Some(order_col.clone());
    }
    if args.require_scenes {
        config.require_scenes = true;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("csv")
}

/// `data/frames.csv` -> `data/frames.<suffix>.<ext>`
fn sibling_path(file: &Path, suffix: &str, ext: &str) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    file.with_file_name(format!("{stem}.{suffix}.{ext}"))
}
