use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Save Minecraft worlds to an S3 bucket and pull them back.
#[derive(Debug, Parser)]
#[command(name = "save-sync", version, about, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Config file [default: <config dir>/save-sync/config.json]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Saves directory [default: the game's saves folder for this user]
    #[arg(long, global = true, value_name = "PATH")]
    pub saves_dir: Option<PathBuf>,

    /// Directory for staging archives [default: the OS temp dir]
    #[arg(long, global = true, value_name = "PATH")]
    pub scratch_dir: Option<PathBuf>,

    /// Log pipeline steps to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Prints current config
    GetConfig,
    /// Sets up the AWS credentials and bucket
    SetupConfig,
    /// Saves current worlds to AWS S3
    Save,
    /// Pulls worlds from AWS S3 and replaces the current ones
    Pull,
}
