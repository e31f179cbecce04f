use veil_core::{ContainerHeader, RandomAccess, HEADER_BYTES, TAG_LEN};

use super::{open_container, AppContext};
use crate::cli::InfoArgs;
use crate::errors::from_veil;

pub async fn run(ctx: &AppContext, args: InfoArgs) -> anyhow::Result<()> {
    let path = ctx.container_path(args.path)?;
    let mut storage = open_container(&path).await?;

    let size = storage.stat().await.map_err(from_veil)?.size;
    let header = ContainerHeader::read_from(&mut storage)
        .await
        .map_err(from_veil)?;
    let kdf = header.key_header();

    let payload = match size.checked_sub((HEADER_BYTES + TAG_LEN) as u64) {
        Some(len) => format!("{} bytes", len),
        None => "empty".to_string(),
    };

    println!("Container: {}", storage.path().display());
    println!("Version:   {}", header.version());
    println!(
        "KDF:       argon2id13 (opslimit {}, memlimit {} bytes)",
        kdf.opslimit(),
        kdf.memlimit()
    );
    println!("Cipher:    xchacha20-poly1305");
    println!("Payload:   {}", payload);
    if !ctx.quiet {
        println!("Size:      {} bytes on disk", size);
    }
    Ok(())
}
