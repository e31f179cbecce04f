use tracing::{debug, info};
use veil_core::{FileStorage, Overlay, RandomAccess};

use super::AppContext;
use crate::cli::InitArgs;
use crate::config::{resolve_kdf_settings, write_config, VeilConfig};
use crate::errors::{from_veil, CliError};
use crate::passphrase::prompt_init_passphrase;

pub async fn run(ctx: &AppContext, args: InitArgs) -> anyhow::Result<()> {
    let path = ctx.container_path(args.path)?;
    let settings = resolve_kdf_settings(
        args.preset,
        args.opslimit,
        args.memlimit,
        &ctx.config.kdf,
    );
    // Checked here so a bad flag fails before the passphrase prompt.
    settings.validate().map_err(from_veil)?;

    let occupied = tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.len() > 0)
        .unwrap_or(false);
    if occupied && !args.force {
        return Err(CliError::invalid_input(format!(
            "A container already exists at {}. Use --force to replace it.",
            path.display()
        ))
        .into());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!("Failed to create directory {}: {}", parent.display(), e)
            })?;
        }
    }

    let passphrase = prompt_init_passphrase()?;

    let mut storage = FileStorage::open(&path).await.map_err(from_veil)?;
    if occupied {
        debug!(path = %path.display(), "discarding existing container");
        storage.del(0, u64::MAX).await.map_err(from_veil)?;
    }

    Overlay::create(storage, passphrase, settings)
        .await
        .map_err(from_veil)?;

    info!(
        path = %path.display(),
        opslimit = settings.opslimit,
        memlimit = settings.memlimit,
        "container initialized"
    );

    if !ctx.config_path.exists() {
        let absolute = tokio::fs::canonicalize(&path)
            .await
            .unwrap_or_else(|_| path.clone());
        write_config(&ctx.config_path, &VeilConfig::new(&absolute, args.preset))?;
        debug!(config = %ctx.config_path.display(), "wrote default config");
    }

    if !ctx.quiet {
        println!("Initialized new container at {}", path.display());
    }
    Ok(())
}
