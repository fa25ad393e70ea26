use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tabq")]
#[command(about = "Command line interface for reading SAS-secured table storage")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true, env = "TABQ_CONFIG_DIR")]
    pub config_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Table read commands
    Table {
        #[command(subcommand)]
        command: TableCommands,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TableCommands {
    /// List all rows of a table as JSON
    List {
        /// Table name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the current configuration (tokens masked)
    Show,
}
