use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use TagVault::auth::authenticate;
use TagVault::codec::probe_presence;
use TagVault::image::CardImage;
use TagVault::layout::{writable_universe, FieldId};
use TagVault::metrics;
use TagVault::transport::CardTransport;
use TagVault::VaultConfig;

pub fn exec(image: PathBuf, json: bool) -> Result<()> {
    let cfg = VaultConfig::from_env();
    let mut card = CardImage::open(&image)?;

    // Совместимость и присутствие слотов — той же механикой, что движок.
    card.connect()?;
    let gate_ok = authenticate(&mut card, cfg.gate_block, &cfg.key_a);
    let (slot_one, slot_two) = if gate_ok {
        (
            probe_presence(
                &mut card,
                FieldId::TemplateOne.blocks()[0],
                &cfg.key_a,
                &cfg.magic,
            ),
            probe_presence(
                &mut card,
                FieldId::TemplateTwo.blocks()[0],
                &cfg.key_a,
                &cfg.magic,
            ),
        )
    } else {
        (false, false)
    };
    card.close()?;

    let m = metrics::snapshot();

    if json {
        let obj = json!({
            "image": image.display().to_string(),
            "blocks": card.block_count(),
            "writable_blocks": writable_universe().len(),
            "gate_block": cfg.gate_block,
            "gate_ok": gate_ok,
            "template_one_present": slot_one,
            "template_two_present": slot_two,
            "auth_attempts": m.auth_attempts,
            "auth_failures": m.auth_failures,
            "blocks_read": m.blocks_read,
            "blocks_written": m.blocks_written,
            "probe_hits": m.probe_hits,
            "probe_misses": m.probe_misses,
        });
        println!("{}", obj);
        return Ok(());
    }

    println!("image:            {}", image.display());
    println!("blocks:           {}", card.block_count());
    println!("writable blocks:  {}", writable_universe().len());
    println!(
        "gate check:       block {} -> {}",
        cfg.gate_block,
        if gate_ok { "ok" } else { "FAILED" }
    );
    println!("template one:     {}", if slot_one { "present" } else { "empty" });
    println!("template two:     {}", if slot_two { "present" } else { "empty" });
    println!("fields:");
    for id in FieldId::ALL {
        println!(
            "  {:?}: {} blocks, {} bytes capacity",
            id,
            id.blocks().len(),
            id.capacity()
        );
    }
    println!(
        "auth:             {}/{} failed",
        m.auth_failures, m.auth_attempts
    );
    Ok(())
}
