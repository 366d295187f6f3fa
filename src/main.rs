//! Gateway API Conformance - GatewayClass allocation for parallel conformance runs
//!
//! A CLI tool that declares Gateway API conformance tests and hands out
//! GatewayClasses to parallel test workers so they never collide on shared
//! cluster-scoped resources.
//!
//! ## Features
//!
//! - Declarative conformance tests (features, manifests, expected exchanges)
//! - Single and pooled GatewayClass allocation policies
//! - Parallel assignment preview with exhaustion reporting
//! - Configuration from file, environment and flags
//!
//! ## Usage
//!
//! ```bash
//! # List declared tests
//! gateway-conformance list --detailed
//!
//! # Preview a pooled assignment for 3 workers
//! gateway-conformance allocate -g eg-1,eg-2,eg-3 --policy pool --workers 3
//!
//! # Write an example configuration file
//! gateway-conformance config init
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use tracing::{debug, info};

mod allocator;
mod cli;
mod config;
mod executor;
mod models;
mod output;
mod suite;
mod utils;

use allocator::{new_allocator, AllocationPolicy};
use cli::Args;
use config::{AppConfig, ConfigFile, EnvConfig};
use executor::ParallelExecutor;
use models::SupportedFeature;
use output::{OutputFormat, ReportFormatter};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(LogLevel::from_verbose(args.verbose));

    let env = EnvConfig::load()?;
    if env.has_any() {
        debug!("Environment overrides: {:?}", env);
    }

    match args.command {
        cli::Command::List(list_args) => {
            list_tests(list_args)?;
        }
        cli::Command::Allocate(allocate_args) => {
            let config = load_config(args.config.as_deref(), &env)?;
            allocate(allocate_args, config).await?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, args.config.as_deref(), &env)?;
        }
    }

    Ok(())
}

/// Load the config file (flag, then environment, then standard locations)
fn load_config(path: Option<&std::path::Path>, env: &EnvConfig) -> Result<AppConfig> {
    let path = path.or(env.config_file.as_deref());
    let file = ConfigFile::load_or_default(path)?;
    Ok(file.app.with_env(env))
}

fn formatter(format: OutputFormat) -> ReportFormatter {
    let formatter = ReportFormatter::new(format);
    if std::io::stdout().is_terminal() {
        formatter
    } else {
        formatter.no_color()
    }
}

fn list_tests(args: cli::ListArgs) -> Result<()> {
    let tests = if let Some(name) = &args.test {
        vec![suite::find(name).ok_or_else(|| anyhow::anyhow!("Unknown test: {name}"))?]
    } else if args.features.is_empty() {
        suite::all()
    } else {
        let features = args
            .features
            .iter()
            .map(|f| {
                SupportedFeature::from_str(f).ok_or_else(|| anyhow::anyhow!("Unknown feature: {f}"))
            })
            .collect::<Result<Vec<_>>>()?;
        suite::supported(&features)
    };

    print!(
        "{}",
        formatter(OutputFormat::Table).format_tests(&tests, args.detailed)
    );
    Ok(())
}

async fn allocate(args: cli::AllocateArgs, config: AppConfig) -> Result<()> {
    let policy = args
        .policy
        .as_deref()
        .map(|p| {
            AllocationPolicy::from_str(p).ok_or_else(|| anyhow::anyhow!("Unknown policy: {p}"))
        })
        .transpose()?;

    let config = config.with_overrides(&args.gateway_classes, policy, args.workers);
    config.validate()?;

    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format: {}", args.format))?;

    let tests = suite::all();
    let workers = config.workers.unwrap_or(tests.len());

    let allocator = new_allocator(config.policy, config.gateway_classes.clone())
        .context("Failed to build GatewayClass allocator")?;

    info!(
        "Allocating from {} GatewayClass(es) in namespace {}",
        config.gateway_classes.len(),
        config.namespace
    );

    let report = ParallelExecutor::new(workers)
        .assign(allocator, &tests, config.policy.name())
        .await?;

    println!("{}", formatter(format).format_report(&report));

    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} workers failed to allocate or free their GatewayClass",
            report.failed(),
            report.workers
        );
    }

    Ok(())
}

fn manage_config(
    args: cli::ConfigArgs,
    path: Option<&std::path::Path>,
    env: &EnvConfig,
) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {}. Use --force to overwrite.",
                    output.display()
                );
            }

            ConfigFile::example().save(&output)?;
            println!("✓ Configuration file created: {}", output.display());
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show => {
            let app = load_config(path, env)?;
            let effective = ConfigFile {
                app,
                ..ConfigFile::default()
            };
            println!("{}", serde_yaml::to_string(&effective)?);
        }

        cli::ConfigAction::Env => {
            env.print_summary();
            println!();
            config::print_env_help();
        }
    }

    Ok(())
}
