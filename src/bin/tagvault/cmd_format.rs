use anyhow::{anyhow, Result};
use std::path::PathBuf;

use TagVault::engine::{Engine, Outcome};
use TagVault::image::CardImage;
use TagVault::layout::writable_universe;
use TagVault::VaultConfig;

pub fn exec(image: PathBuf) -> Result<()> {
    let mut card = CardImage::open(&image)?;
    let engine = Engine::new(VaultConfig::from_env());

    match engine.format(&mut card) {
        Outcome::SuccessEmpty => {
            println!("Format completed ({} blocks swept)", writable_universe().len());
            Ok(())
        }
        Outcome::Success(_) => Ok(()), // format не возвращает этот исход
        Outcome::IncompatibleCard => Err(anyhow!("card is not compatible")),
        Outcome::ConnectionLost => Err(anyhow!("connection lost")),
        Outcome::Error(msg) => Err(anyhow!(msg)),
    }
}
