use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use veil_core::{Preset, VERSION};

/// Veil - keep a single file encrypted under a passphrase
#[derive(Parser)]
#[command(name = "veil")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the container file
    #[arg(short, long, global = true, env = "VEIL_PATH")]
    pub container: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true, env = "VEIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new, empty container
    Init(InitArgs),

    /// Encrypt stdin (or a file) into an existing container
    Write(WriteArgs),

    /// Decrypt a container to stdout (or a file)
    Read(ReadArgs),

    /// Show container header parameters (no passphrase needed)
    Info(InfoArgs),
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the container will be created
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Key derivation cost tier
    #[arg(long, value_name = "PRESET", value_parser = parse_preset)]
    pub preset: Option<Preset>,

    /// Argon2 iterations (overrides the preset)
    #[arg(long, value_name = "N")]
    pub opslimit: Option<u32>,

    /// Argon2 memory in bytes (overrides the preset)
    #[arg(long, value_name = "BYTES")]
    pub memlimit: Option<u32>,

    /// Replace an existing container, discarding its contents
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `write` command
#[derive(Args)]
pub struct WriteArgs {
    /// Container path
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Read plaintext from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,
}

/// Arguments for the `read` command
#[derive(Args)]
pub struct ReadArgs {
    /// Container path
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Write plaintext to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `info` command
#[derive(Args)]
pub struct InfoArgs {
    /// Container path
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

fn parse_preset(value: &str) -> Result<Preset, String> {
    value.parse::<Preset>().map_err(|e| e.to_string())
}
