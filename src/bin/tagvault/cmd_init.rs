use anyhow::Result;
use std::path::PathBuf;

use TagVault::image::CardImage;

pub fn exec(image: PathBuf) -> Result<()> {
    let card = CardImage::create(&image)?;
    println!(
        "Created blank card image at {} ({} blocks, factory trailers)",
        card.path().display(),
        card.block_count()
    );
    Ok(())
}
