//! Command handlers and the context they share.

mod info;
mod init;
mod read;
mod write;

use std::path::{Path, PathBuf};

use veil_core::FileStorage;

use crate::cli::{Cli, Commands};
use crate::config::{default_config_path, default_container_path, load_config, VeilConfig};
use crate::errors::{from_veil, CliError};

/// Settings resolved once per invocation.
pub struct AppContext {
    pub quiet: bool,
    pub config_path: PathBuf,
    pub config: VeilConfig,
    container_flag: Option<PathBuf>,
}

impl AppContext {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = match cli.config.clone() {
            Some(path) => path,
            None => default_config_path()?,
        };
        let config = load_config(&config_path)?;
        Ok(Self {
            quiet: cli.quiet,
            config_path,
            config,
            container_flag: cli.container.clone(),
        })
    }

    /// Resolve the container path.
    ///
    /// Precedence: positional argument, `--container` / `VEIL_PATH`, the
    /// config file, then the XDG data directory.
    pub fn container_path(&self, positional: Option<PathBuf>) -> anyhow::Result<PathBuf> {
        if let Some(path) = positional.or_else(|| self.container_flag.clone()) {
            return Ok(path);
        }
        if let Some(path) = self.config.container.path.as_deref() {
            return Ok(PathBuf::from(path));
        }
        default_container_path()
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::load(&cli)?;
    match cli.command {
        Commands::Init(args) => init::run(&ctx, args).await,
        Commands::Write(args) => write::run(&ctx, args).await,
        Commands::Read(args) => read::run(&ctx, args).await,
        Commands::Info(args) => info::run(&ctx, args).await,
    }
}

/// Open an existing container file, reporting a missing one with a hint.
async fn open_container(path: &Path) -> anyhow::Result<FileStorage> {
    if !path.exists() {
        return Err(CliError::not_found(
            format!("No container found at {}", path.display()),
            format!("Run:\n  veil init {}", path.display()),
        )
        .into());
    }
    FileStorage::open_existing(path).await.map_err(from_veil)
}
