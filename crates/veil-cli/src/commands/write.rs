use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::debug;
use veil_core::{Overlay, RandomAccess, HEADER_BYTES};
use zeroize::Zeroizing;

use super::{open_container, AppContext};
use crate::cli::WriteArgs;
use crate::errors::{from_veil, CliError};
use crate::passphrase::prompt_passphrase;

pub async fn run(ctx: &AppContext, args: WriteArgs) -> anyhow::Result<()> {
    let path = ctx.container_path(args.path)?;
    let mut storage = open_container(&path).await?;
    let has_payload = storage.stat().await.map_err(from_veil)?.size > HEADER_BYTES as u64;

    let plaintext = read_input(args.input.as_deref()).await?;
    let passphrase = prompt_passphrase()?;
    let overlay = Overlay::new(storage, passphrase);

    if has_payload {
        // A fresh container has nothing to authenticate against; otherwise
        // refuse to replace data sealed under a different passphrase.
        overlay.read().await.map_err(from_veil)?;
        debug!("existing payload authenticated");
    }

    overlay.write(&plaintext).await.map_err(from_veil)?;

    if !ctx.quiet {
        eprintln!("Wrote {} bytes to {}", plaintext.len(), path.display());
    }
    Ok(())
}

async fn read_input(input: Option<&Path>) -> anyhow::Result<Zeroizing<Vec<u8>>> {
    match input {
        Some(file) => {
            if !file.exists() {
                return Err(CliError::not_found(
                    format!("Input file not found: {}", file.display()),
                    "Pass an existing file to --input, or pipe the data on stdin.",
                )
                .into());
            }
            let bytes = tokio::fs::read(file)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
            Ok(Zeroizing::new(bytes))
        }
        None => {
            let mut buffer = Zeroizing::new(Vec::new());
            tokio::io::stdin()
                .read_to_end(&mut buffer)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
            Ok(buffer)
        }
    }
}
