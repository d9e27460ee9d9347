pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pods")]
#[command(about = "Drive the in-memory pods document store")]
pub struct Args {
    /// TOML config file (defaults are used when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level, overriding the config file
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: crate::Command,
}
