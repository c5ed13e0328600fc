// server/src/cli/commands.rs

// Command-line arguments and subcommands for the clinic portal binary.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(name = "clinic-portal", version, about = "Clinic patient portal API server")]
pub struct CliArgs {
    /// Defaults to `serve` with no overrides.
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Wipe the store and load the demo patients and reference lists.
    Seed(SeedArgs),
}

#[derive(Debug, Args, PartialEq, Default)]
pub struct ServeArgs {
    #[clap(long)]
    pub host: Option<String>,
    #[clap(long, short = 'p')]
    pub port: Option<u16>,
    #[clap(long, value_hint = clap::ValueHint::DirPath)]
    pub storage_path: Option<PathBuf>,
    #[clap(long = "config", short = 'c', value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Args, PartialEq, Default)]
pub struct SeedArgs {
    #[clap(long, value_hint = clap::ValueHint::DirPath)]
    pub storage_path: Option<PathBuf>,
    #[clap(long = "config", short = 'c', value_hint = clap::ValueHint::FilePath)]
    pub config_file: Option<PathBuf>,
}
