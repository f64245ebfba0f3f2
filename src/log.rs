use crate::input::PlotJobConfig;
use crate::JobSummary;
use std::time::Duration;

pub fn show_greeting(source: &str) {
    println!("=== LLC Grid Plotter ===");
    println!("Loading configuration from: {}", source);
}

pub fn config_echo(config: &PlotJobConfig) {
    println!("\nConfiguration:");
    println!("  Input dataset: {}", config.input);
    println!("  Output: {}", config.output);
    match &config.variable {
        Some(variable) => println!("  Variable: {}", variable),
        None => println!("  Variable: (coordinates only)"),
    }
    match config.export_format() {
        Ok(format) => println!("  Format: {}", format.as_str()),
        Err(_) => println!("  Format: unknown"),
    }
}

pub fn show_summary(summary: &JobSummary) {
    let (rows, cols) = summary.grid_shape;
    println!("\nFlattened Grid:");
    println!("  Faces: {}", summary.faces);
    println!("  Grid: {} x {} (j x i)", rows, cols);
    if let Some(variable) = &summary.variable {
        println!("  Bound variable: {}", variable);
        if let Some(steps) = summary.time_steps {
            println!("  Time steps: {}", steps);
        }
    }
}

pub fn show_farewell_with_timing(elapsed: Duration) {
    println!(
        "\n=== Flattening completed successfully in {:.2}s ===",
        elapsed.as_secs_f64()
    );
}
