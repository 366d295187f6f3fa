//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gateway API conformance support tool
#[derive(Parser, Debug)]
#[command(name = "gateway-conformance")]
#[command(version)]
#[command(about = "Declare Gateway API conformance tests and allocate GatewayClasses to parallel workers")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List declared conformance tests
    List(ListArgs),

    /// Assign GatewayClasses to parallel workers
    Allocate(AllocateArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show a single test by short name
    pub test: Option<String>,

    /// Show every expected exchange
    #[arg(short, long)]
    pub detailed: bool,

    /// Only tests runnable with these features (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub features: Vec<String>,
}

/// Arguments for allocate command
#[derive(Parser, Debug)]
pub struct AllocateArgs {
    /// GatewayClass to allocate from (repeat or comma-separate for a pool)
    #[arg(short, long = "gateway-class", value_delimiter = ',')]
    pub gateway_classes: Vec<String>,

    /// Allocation policy (single, pool)
    #[arg(short, long)]
    pub policy: Option<String>,

    /// Number of parallel workers
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Output format (table, json, json-pretty)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "gateway-conformance.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show environment variables
    Env,
}
