use tokio::io::AsyncWriteExt;
use veil_core::{Overlay, RandomAccess, HEADER_BYTES};

use super::{open_container, AppContext};
use crate::cli::ReadArgs;
use crate::errors::{from_veil, CliError};
use crate::passphrase::prompt_passphrase;

pub async fn run(ctx: &AppContext, args: ReadArgs) -> anyhow::Result<()> {
    let path = ctx.container_path(args.path)?;
    let mut storage = open_container(&path).await?;

    if storage.stat().await.map_err(from_veil)?.size <= HEADER_BYTES as u64 {
        return Err(CliError::not_found(
            format!("Container at {} holds no data yet", path.display()),
            format!("Run:\n  veil write {}", path.display()),
        )
        .into());
    }

    let overlay = Overlay::new(storage, prompt_passphrase()?);
    let plaintext = overlay.read().await.map_err(from_veil)?;

    match args.output {
        Some(output) => {
            tokio::fs::write(&output, &plaintext[..])
                .await
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", output.display(), e))?;
            if !ctx.quiet {
                eprintln!("Decrypted {} bytes to {}", plaintext.len(), output.display());
            }
        }
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&plaintext).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
