//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Nested asynchronous test runner
#[derive(Parser, Debug)]
#[command(name = "treetest")]
#[command(version)]
#[command(about = "Run nested asynchronous test suites and report their status tree")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run built-in suites
    Run(RunArgs),

    /// List available suites
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Suite to run (demo, selftest, all)
    #[arg(short, long, default_value = "all")]
    pub suite: String,

    /// Output format (tree, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Exit with a non-zero status if any suite fails or does not finish
    #[arg(long)]
    pub check: bool,

    /// Also write the reports to this file
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show suite descriptions
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Output file path
        #[arg(short, long, default_value = "./treetest.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment overrides instead
        #[arg(short, long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate, defaults to the first one found
        #[arg(short, long)]
        file: Option<String>,
    },

    /// List environment variables
    Env,
}
