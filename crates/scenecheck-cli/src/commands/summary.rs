//! Summary command - print a saved run report.

use std::path::PathBuf;

use colored::Colorize;
use scenecheck::Report;

pub fn run(file: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let report = Report::load(&file)?;

    if json {
        let summary = serde_json::json!({
            "rows": report.run().rows,
            "scenes": report.run().scenes,
            "sequence_checks": report.sequence_checks(),
            "rows_normalized": report.counts().rows_normalized,
            "segments_flipped": report.total_flips(),
            "segments_flagged": report.total_flags(),
            "violations": report.total_violations(),
            "warnings": report.counts().warnings.len(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

/// Print a report in human-readable form.
pub fn print_report(report: &Report) {
    let run = report.run();
    let counts = report.counts();

    println!("{}", "Run".cyan().bold());
    println!(
        "  {} rows in {} scenes (n={}, m={}), sequence checks {}",
        run.rows.to_string().white().bold(),
        run.scenes.to_string().white().bold(),
        run.thresholds.n,
        run.thresholds.m,
        report.sequence_checks()
    );
    println!(
        "  {} rows normalized",
        counts.rows_normalized.to_string().white().bold()
    );

    if !counts.smoothing.is_empty() {
        println!();
        println!("{}", "Smoothing".cyan().bold());
        for (field, smoothing) in &counts.smoothing {
            println!(
                "  {:30} {} flipped ({} values), {} short, {} boundary",
                field,
                smoothing.segments_flipped.to_string().green(),
                smoothing.values_flipped,
                smoothing.segments_flagged_short.to_string().yellow(),
                smoothing.segments_flagged_boundary
            );
        }
    }

    println!();
    println!(
        "{} {}",
        "Violations".cyan().bold(),
        report.total_violations().to_string().red().bold()
    );
    for (group, reasons) in &counts.violations {
        for (reason, count) in reasons {
            println!("  {:30} {:>6}  {}", group, count.to_string().red(), reason);
        }
    }

    if !counts.warnings.is_empty() {
        println!();
        println!("{}", "Warnings".yellow().bold());
        for warning in &counts.warnings {
            println!("  {}", warning);
        }
    }
}
