use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use TagVault::engine::{Engine, Outcome};
use TagVault::image::CardImage;
use TagVault::record::CardRecord;
use TagVault::VaultConfig;

pub struct Args {
    pub image: PathBuf,
    pub patch: Option<PathBuf>,
    pub field_one: Option<String>,
    pub field_two: Option<String>,
    pub field_three: Option<String>,
    pub field_four: Option<String>,
    pub field_five: Option<String>,
    pub field_six: Option<String>,
    pub field_seven: Option<String>,
    pub template_one: Option<PathBuf>,
    pub template_two: Option<PathBuf>,
}

pub fn exec(args: Args) -> Result<()> {
    let patch = build_patch(&args)?;
    if patch.is_empty() {
        return Err(anyhow!("empty patch: nothing to write"));
    }

    let mut card = CardImage::open(&args.image)?;
    let engine = Engine::new(VaultConfig::from_env());

    match engine.write(&mut card, &patch) {
        Outcome::SuccessEmpty => {
            println!("Write completed");
            Ok(())
        }
        Outcome::Success(_) => Ok(()), // write не возвращает этот исход
        Outcome::IncompatibleCard => Err(anyhow!("card is not compatible")),
        Outcome::ConnectionLost => Err(anyhow!("connection lost")),
        Outcome::Error(msg) => Err(anyhow!(msg)),
    }
}

/// Патч: JSON-файл как основа, отдельные флаги поверх него.
fn build_patch(args: &Args) -> Result<CardRecord> {
    let mut patch = match &args.patch {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read patch file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse patch file {}", path.display()))?
        }
        None => CardRecord::default(),
    };

    if args.field_one.is_some() {
        patch.field_one = args.field_one.clone();
    }
    if args.field_two.is_some() {
        patch.field_two = args.field_two.clone();
    }
    if args.field_three.is_some() {
        patch.field_three = args.field_three.clone();
    }
    if args.field_four.is_some() {
        patch.field_four = args.field_four.clone();
    }
    if args.field_five.is_some() {
        patch.field_five = args.field_five.clone();
    }
    if args.field_six.is_some() {
        patch.field_six = args.field_six.clone();
    }
    if args.field_seven.is_some() {
        patch.field_seven = args.field_seven.clone();
    }

    if let Some(path) = &args.template_one {
        patch.template_one = Some(
            std::fs::read(path).with_context(|| format!("read template {}", path.display()))?,
        );
    }
    if let Some(path) = &args.template_two {
        patch.template_two = Some(
            std::fs::read(path).with_context(|| format!("read template {}", path.display()))?,
        );
    }

    Ok(patch)
}
