use anyhow::{anyhow, Result};
use std::path::PathBuf;

use TagVault::engine::{Engine, Outcome};
use TagVault::image::CardImage;
use TagVault::layout::FieldId;
use TagVault::record::CardRecord;
use TagVault::VaultConfig;

pub fn exec(image: PathBuf, json: bool) -> Result<()> {
    let mut card = CardImage::open(&image)?;
    let engine = Engine::new(VaultConfig::from_env());

    match engine.read(&mut card) {
        Outcome::Success(record) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
            Ok(())
        }
        Outcome::SuccessEmpty => Ok(()), // read не возвращает этот исход
        Outcome::IncompatibleCard => Err(anyhow!("card is not compatible")),
        Outcome::ConnectionLost => Err(anyhow!("connection lost")),
        Outcome::Error(msg) => Err(anyhow!(msg)),
    }
}

fn print_record(record: &CardRecord) {
    for id in FieldId::ALL {
        if id.is_binary() {
            match record.binary(id) {
                Some(bytes) => println!("{:?}: <{} bytes>", id, bytes.len()),
                None => println!("{:?}: <empty>", id),
            }
        } else {
            match record.text(id) {
                Some(text) => println!("{:?}: {}", id, text),
                None => println!("{:?}: <empty>", id),
            }
        }
    }
}
