//! # CLI Integration Tests
//!
//! Tests for the command-line interface: argument parsing, subcommand
//! options and how the flatten job configuration is assembled.

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    use crate::cli::{Cli, Commands, OutputFormat, resolve_job_config};
    use crate::input::PlotJobConfig;
    use crate::output::ExportFormat;

    /// Test basic CLI argument parsing
    #[test]
    fn test_cli_help() {
        let result = Cli::try_parse_from(["llc-plotter", "--help"]);
        assert!(result.is_err()); // --help causes early exit with "error"

        let error = result.unwrap_err();
        assert!(error.to_string().contains("LLC (Lat-Lon-Cap) grid"));
    }

    /// Test version argument
    #[test]
    fn test_cli_version() {
        let result = Cli::try_parse_from(["llc-plotter", "--version"]);
        assert!(result.is_err()); // --version causes early exit
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    /// Test global flags
    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "llc-plotter",
            "--verbose",
            "--output-format",
            "json",
            "--config",
            "/path/to/job.json",
            "validate",
        ]);

        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert_eq!(cli.output_format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/job.json")));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["llc-plotter", "info", "llc.nc", "--quiet"]);
        assert!(cli.quiet);
        assert_eq!(cli.output_format, OutputFormat::Human);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["llc-plotter", "-v", "-q", "validate"]);
        assert!(result.is_err());
    }

    /// Test flatten command argument parsing
    #[test]
    fn test_flatten_command_basic() {
        let cli = Cli::parse_from([
            "llc-plotter",
            "flatten",
            "ecco_llc90.nc",
            "ssh.parquet",
            "-n",
            "SSH",
        ]);

        if let Commands::Flatten {
            input,
            output,
            variable,
            format,
            force,
            dry_run,
        } = &cli.command
        {
            assert_eq!(input, &Some("ecco_llc90.nc".to_string()));
            assert_eq!(output, &Some("ssh.parquet".to_string()));
            assert_eq!(variable, &Some("SSH".to_string()));
            assert_eq!(format, &None);
            assert!(!force);
            assert!(!dry_run);
        } else {
            panic!("Expected Flatten command");
        }
    }

    #[test]
    fn test_flatten_command_options() {
        let cli = Cli::parse_from([
            "llc-plotter",
            "flatten",
            "llc.json",
            "grid.out",
            "--variable",
            "ETAN",
            "--format",
            "json",
            "--force",
            "--dry-run",
        ]);

        if let Commands::Flatten {
            variable,
            format,
            force,
            dry_run,
            ..
        } = &cli.command
        {
            assert_eq!(variable.as_deref(), Some("ETAN"));
            assert_eq!(format, &Some(ExportFormat::Json));
            assert!(force);
            assert!(dry_run);
        } else {
            panic!("Expected Flatten command");
        }
    }

    #[test]
    fn test_flatten_rejects_unknown_format() {
        let result = Cli::try_parse_from([
            "llc-plotter",
            "flatten",
            "llc.nc",
            "out.csv",
            "--format",
            "csv",
        ]);
        assert!(result.is_err());
    }

    /// Test flatten with config file and no positional arguments
    #[test]
    fn test_flatten_from_config_file() {
        let cli = Cli::parse_from(["llc-plotter", "--config", "job.yaml", "flatten"]);
        assert_eq!(cli.config, Some(PathBuf::from("job.yaml")));

        if let Commands::Flatten { input, output, .. } = cli.command {
            let base = PlotJobConfig {
                input: "from_config.nc".to_string(),
                output: "from_config.json".to_string(),
                variable: Some("SSH".to_string()),
                format: None,
            };
            let config = resolve_job_config(Some(base.clone()), input, output, None, None)
                .unwrap();
            assert_eq!(config, base);
        } else {
            panic!("Expected Flatten command");
        }
    }

    #[test]
    fn test_info_command() {
        let cli = Cli::parse_from([
            "llc-plotter",
            "info",
            "ecco_llc90.nc",
            "-n",
            "SSH",
            "--format",
            "yaml",
        ]);

        if let Commands::Info {
            file,
            variable,
            format,
        } = &cli.command
        {
            assert_eq!(file, "ecco_llc90.nc");
            assert_eq!(variable.as_deref(), Some("SSH"));
            assert_eq!(format, &Some(OutputFormat::Yaml));
        } else {
            panic!("Expected Info command");
        }
    }

    #[test]
    fn test_info_requires_file() {
        assert!(Cli::try_parse_from(["llc-plotter", "info"]).is_err());
    }

    #[test]
    fn test_validate_command() {
        let cli = Cli::parse_from(["llc-plotter", "validate", "job.json"]);
        if let Commands::Validate { config_file } = &cli.command {
            assert_eq!(config_file, &Some(PathBuf::from("job.json")));
        } else {
            panic!("Expected Validate command");
        }

        let cli = Cli::parse_from(["llc-plotter", "validate"]);
        assert!(matches!(cli.command, Commands::Validate { config_file: None }));
    }

    #[test]
    fn test_completions_command() {
        let cli = Cli::parse_from(["llc-plotter", "completions", "bash", "-o", "llc.bash"]);
        if let Commands::Completions { shell, output } = &cli.command {
            assert_eq!(*shell, clap_complete::Shell::Bash);
            assert_eq!(output, &Some(PathBuf::from("llc.bash")));
        } else {
            panic!("Expected Completions command");
        }

        assert!(Cli::try_parse_from(["llc-plotter", "completions", "tcsh"]).is_err());
    }

    #[test]
    fn test_completions_generate_output() {
        let mut cmd = Cli::command();
        let mut buffer = Vec::new();
        clap_complete::generate(clap_complete::Shell::Bash, &mut cmd, "llc-plotter", &mut buffer);
        let script = String::from_utf8(buffer).unwrap();
        assert!(script.contains("llc-plotter"));
        assert!(script.contains("flatten"));
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(Cli::try_parse_from(["llc-plotter"]).is_err());
    }
}
