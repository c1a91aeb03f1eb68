mod cli_args;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::Cli;
use condenser_core::{AppError, CondenseOptions, Config, CondenseReport, RuleSet, run_condense};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);
    log::debug!("CLI args parsed: {:?}", cli_args);

    let quiet = cli_args.quiet;
    let exit_code = match run_app(cli_args) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let exit_code = match e.downcast_ref::<AppError>() {
                Some(AppError::Config(_)) => 1,
                Some(AppError::TomlParse(_)) => 1,
                Some(AppError::Io(_)) => 2,
                Some(AppError::FileRead { .. }) => 2,
                Some(AppError::FileWrite { .. }) => 2,
                Some(AppError::DirCreation { .. }) => 2,
                Some(AppError::WalkDir(_)) => 2,
                Some(AppError::Glob(_)) => 2,
                Some(AppError::Chunking(_)) => 3,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli) -> Result<()> {
    let quiet = cli.quiet;
    let root = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));

    let config_path =
        Config::resolve_config_path(&root, cli.config.as_ref(), cli.no_config)
            .context("Failed to resolve configuration path")?;
    let config = match &config_path {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };

    let options = build_options(&cli, &root, config)?;
    log::debug!("Effective options: {:?}", options);

    let mut progress = |message: &str, percent: u8| {
        if quiet {
            return;
        }
        if percent > 0 {
            eprintln!("{} {}", format!("[{:>3}%]", percent).blue(), message);
        } else {
            eprintln!("       {}", message);
        }
    };

    let report = run_condense(&options, &mut progress).context("Processing failed")?;
    print_outcome(&report, quiet);

    Ok(())
}

/// Merges CLI overrides on top of the loaded config file and assembles the
/// final run options. List flags replace the configured lists wholesale;
/// `--extra-extensions` appends.
fn build_options(cli: &Cli, root: &Path, mut config: Config) -> Result<CondenseOptions> {
    if let Some(dirs) = &cli.exclude_dirs {
        config.filters.exclude_dirs = dirs.clone();
    }
    if let Some(files) = &cli.exclude_files {
        config.filters.exclude_files = files.clone();
    }
    if let Some(exts) = &cli.exclude_extensions {
        config.filters.exclude_extensions = exts.clone();
    }
    config
        .filters
        .extra_extensions
        .extend(cli.extra_extensions.iter().cloned());
    if cli.no_gitignore {
        config.filters.use_gitignore = false;
    }
    if cli.no_structure {
        config.output.include_structure = false;
    }
    if cli.structure_only {
        config.output.structure_only = true;
        config.output.include_structure = true;
    }
    if cli.chunked {
        config.output.chunked = true;
    }
    if let Some(max_lines) = cli.max_lines {
        config.output.max_lines = max_lines;
    }

    let rules: RuleSet = config.to_rule_set();
    let output_path = match &cli.output {
        Some(path) => path.clone(),
        None => PathBuf::from(format!("{}_codebase.txt", root_name(root))),
    };

    Ok(CondenseOptions {
        root_dir: root.to_path_buf(),
        output_path,
        rules,
        include_structure: config.output.include_structure,
        structure_only: config.output.structure_only,
        chunked: config.output.chunked,
        max_lines: config.output.max_lines,
    })
}

fn root_name(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "project".to_string())
}

fn print_outcome(report: &CondenseReport, quiet: bool) {
    if !quiet {
        match report.written_files.len() {
            0 => eprintln!(
                "{}",
                "No text content was found or generated after applying exclusions.".yellow()
            ),
            1 => eprintln!(
                "{} Analysis complete. Output saved to: {}",
                "\u{2705}".green(),
                report.written_files[0].display().to_string().blue()
            ),
            n => {
                let dir = report.written_files[0]
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ".".to_string());
                eprintln!(
                    "{} Analysis complete. Output split into {} files in directory: {}",
                    "\u{2705}".green(),
                    n,
                    dir.blue()
                );
            }
        }
    }

    if !report.read_errors.is_empty() && !quiet {
        eprintln!(
            "\n{}",
            "⚠️ Warning: Some files could not be read properly or were skipped due to encoding issues:"
                .yellow()
        );
        for err in report.read_errors.iter().take(10) {
            eprintln!(" - {}", err);
        }
        if report.read_errors.len() > 10 {
            eprintln!(" ... and {} more.", report.read_errors.len() - 10);
        }
    }
}
