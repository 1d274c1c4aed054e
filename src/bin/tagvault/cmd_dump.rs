use anyhow::Result;
use std::path::PathBuf;

use TagVault::image::CardImage;
use TagVault::layout::{is_trailer, writable_universe};
use TagVault::util::hex_dump;

pub fn exec(image: PathBuf) -> Result<()> {
    let card = CardImage::open(&image)?;
    let universe = writable_universe();

    for block in 0..card.block_count() {
        let bytes = card.raw_block(block)?;
        let mark = if is_trailer(block) {
            "T" // sector trailer: keys + access bits
        } else if universe.contains(&block) {
            "*" // addressed by some field
        } else {
            " "
        };
        println!("{:2} {} {}", block, mark, hex_dump(bytes));
    }
    Ok(())
}
