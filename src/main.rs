//! treetest - nested asynchronous test runner
//!
//! Runs the built-in suites through the harness and renders the status
//! tree each root test reports.
//!
//! ## Usage
//!
//! ```bash
//! # Run every suite as a coloured tree
//! treetest run
//!
//! # Run one suite as JSON and fail the process on any failure
//! treetest run --suite demo --format json --check
//!
//! # List available suites
//! treetest list --detailed
//!
//! # Write a default configuration file
//! treetest config init
//! ```

use anyhow::Result;
use clap::Parser;
use tokio::task::LocalSet;
use tracing::{debug, info};

use treetest::cli::{self, Args};
use treetest::config::{print_env_help, AppConfig, EnvConfig};
use treetest::executor::Harness;
use treetest::output::{write_reports_to_file, ResultFormatter};
use treetest::suites::Suite;
use treetest::utils::logger::{init_logger, route_panics_to_log, LogLevel};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        cli::Command::Run(run_args) => {
            let passed = run_suites(run_args, args.verbose).await?;
            if !passed {
                std::process::exit(1);
            }
        }
        cli::Command::List(list_args) => {
            list_suites(list_args);
        }
        cli::Command::Config(config_args) => {
            init_logger(if args.verbose { LogLevel::Debug } else { LogLevel::Warn });
            manage_config(config_args)?;
        }
    }

    Ok(())
}

/// Resolve configuration: CLI flags over environment over file over defaults
fn load_config(path: Option<&str>, env: &EnvConfig) -> Result<AppConfig> {
    let mut config = match path.or(env.config_file.as_deref()) {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    config.merge_env(env);
    config.validate()?;
    Ok(config)
}

/// Returns false only when `--check` is set and some suite did not pass
async fn run_suites(args: cli::RunArgs, verbose: bool) -> Result<bool> {
    let env = EnvConfig::load();
    let mut config = load_config(args.config.as_deref(), &env)?;

    if let Some(format) = &args.format {
        config.format.clone_from(format);
    }
    if args.no_color {
        config.color = false;
    }
    config.validate()?;

    let level = if verbose {
        config.log_level().max(LogLevel::Debug)
    } else {
        config.log_level()
    };
    init_logger(level);
    route_panics_to_log();
    debug!("Effective configuration: {:?}", config);

    let suites = Suite::select(&args.suite).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown suite: {} (expected one of: all, {})",
            args.suite,
            Suite::all()
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })?;

    let harness = Harness::new().with_deadline(config.suite_timeout());
    let tests: Vec<_> = suites.iter().map(Suite::build).collect();

    info!("Running {} suite(s)", tests.len());
    let reports = LocalSet::new()
        .run_until(harness.run_all(&tests))
        .await;

    let format = config.output_format();
    let formatter = ResultFormatter::new(format).with_color(config.color);
    println!("{}", formatter.format_reports(&reports));

    if let Some(output) = &args.output {
        write_reports_to_file(output, &reports, format)?;
        info!("Reports written to {}", output);
    }

    let all_passed = reports.iter().all(|r| r.is_success());
    Ok(all_passed || !args.check)
}

fn list_suites(args: cli::ListArgs) {
    println!("\nBuilt-in Suites ({} total)\n", Suite::all().len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for suite in Suite::all() {
        if args.detailed {
            println!("  {:10} {}", suite.name(), suite.description());
        } else {
            println!("  {}", suite.name());
        }
    }

    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    use std::path::Path;

    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            AppConfig::default().save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env, format } => {
            let env_config = EnvConfig::load();
            if env {
                env_config.print_summary();
            } else {
                let config = load_config(None, &env_config)?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file.unwrap_or_else(|| {
                AppConfig::find()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "./treetest.yaml".to_string())
            });

            match AppConfig::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => {
            print_env_help();
        }
    }

    Ok(())
}
