use crate::tracing::{LogLevel, TracingFormat};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "parsecache")]
#[command(about = "Inspect the tiered build-file parse cache")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub log_level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Show the resolved parser cache policy")]
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(
        long,
        help = "Configuration file [default: <project-root>/.parsecache.toml]"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Project root directory", default_value = ".")]
    pub project_root: PathBuf,

    #[arg(
        long,
        help = "Build output directory, relative to the project root",
        default_value = parsecache::DEFAULT_OUTPUT_DIR
    )]
    pub output_dir: PathBuf,

    #[arg(long, help = "Print the report as JSON")]
    pub json: bool,
}

impl StatusArgs {
    /// Configuration file to read
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.project_root.join(".parsecache.toml"))
    }
}
