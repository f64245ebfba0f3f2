use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use llc_plotter::cli::{Cli, Commands, OutputFormat, check_output_path, resolve_job_config};
use llc_plotter::info::{
    get_dataset_info, print_dataset_info_human, print_dataset_info_json, print_dataset_info_yaml,
};
use llc_plotter::input::PlotJobConfig;
use llc_plotter::log::{config_echo, show_farewell_with_timing, show_greeting, show_summary};
use llc_plotter::{JobStage, process_plot_job_with_progress};
use log::{LevelFilter, info};
use std::fs::File;
use std::io;
use std::time::Instant;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    match &cli.command {
        Commands::Flatten {
            input,
            output,
            variable,
            format,
            force,
            dry_run,
        } => {
            let base = match &cli.config {
                Some(path) => Some(
                    PlotJobConfig::from_file(path)
                        .with_context(|| format!("Failed to load config {}", path.display()))?,
                ),
                None => None,
            };
            let config = match resolve_job_config(
                base,
                input.clone(),
                output.clone(),
                variable.clone(),
                *format,
            ) {
                Ok(config) => config,
                Err(e) => bail!(e),
            };
            run_flatten(&cli, &config, *force, *dry_run)
        }
        Commands::Info {
            file,
            variable,
            format,
        } => {
            let info = get_dataset_info(file, variable.as_deref())?;
            match (*format).unwrap_or(cli.output_format) {
                OutputFormat::Human => print_dataset_info_human(&info),
                OutputFormat::Json => print_dataset_info_json(&info)?,
                OutputFormat::Yaml => print_dataset_info_yaml(&info)?,
            }
            Ok(())
        }
        Commands::Validate { config_file } => {
            let path = config_file
                .as_ref()
                .or(cli.config.as_ref())
                .context("No configuration file given")?;
            let config = PlotJobConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.validate()?;
            if !cli.quiet {
                println!("Configuration {} is valid", path.display());
                config_echo(&config);
            }
            Ok(())
        }
        Commands::Completions { shell, output } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            match output {
                Some(path) => {
                    let mut file = File::create(path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    clap_complete::generate(*shell, &mut cmd, name, &mut file);
                }
                None => clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout()),
            }
            Ok(())
        }
    }
}

fn init_logging(cli: &Cli) {
    let mut builder = env_logger::Builder::from_default_env();
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if cli.quiet {
        builder.filter_level(LevelFilter::Error);
    } else if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Info);
    }
    builder.init();
}

fn run_flatten(cli: &Cli, config: &PlotJobConfig, force: bool, dry_run: bool) -> Result<()> {
    let start_time = Instant::now();
    let human = !cli.quiet && cli.output_format == OutputFormat::Human;

    if human {
        let source = cli
            .config
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "command line".to_string());
        show_greeting(&source);
        config_echo(config);
    }

    config.validate()?;
    config.export_format()?;
    if dry_run {
        info!("Dry run: configuration is valid, nothing written");
        return Ok(());
    }
    if let Err(e) = check_output_path(&config.output, force) {
        bail!(e);
    }

    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(JobStage::ALL.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("█▓░"),
    );

    let mut started = false;
    let summary = process_plot_job_with_progress(config, |stage| {
        if started {
            pb.inc(1);
        }
        started = true;
        pb.set_message(stage.as_str());
    })
    .with_context(|| format!("Failed to flatten {} into {}", config.input, config.output))?;
    pb.inc(1);
    pb.finish_and_clear();

    match cli.output_format {
        OutputFormat::Human if !cli.quiet => {
            show_summary(&summary);
            show_farewell_with_timing(start_time.elapsed());
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary to JSON")?
        ),
        OutputFormat::Yaml => println!(
            "{}",
            serde_yaml::to_string(&summary).context("Failed to serialize summary to YAML")?
        ),
        _ => {}
    }
    Ok(())
}
