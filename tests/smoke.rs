use anyhow::Result;
use std::path::PathBuf;

use TagVault::engine::{Engine, Outcome};
use TagVault::image::CardImage;
use TagVault::record::CardRecord;
use TagVault::VaultConfig;

#[test]
fn smoke_init_write_read() -> Result<()> {
    let path = unique_path("smoke");

    // 1) init: чистый образ
    {
        let card = CardImage::create(&path)?;
        assert_eq!(card.block_count(), 64);
    }

    let engine = Engine::new(VaultConfig::default());

    // 2) write: все текстовые поля + большой шаблон
    let template = build_template(400, 0xA7);
    {
        let mut card = CardImage::open(&path)?;
        let mut patch = CardRecord::default();
        patch.field_one = Some("ALICE".to_string());
        patch.field_two = Some("COHORT 7".to_string());
        patch.field_three = Some("B POSITIVE".to_string());
        patch.field_four = Some("ENGINEERING".to_string());
        patch.field_five = Some("ROOM 404".to_string());
        patch.field_six = Some("BRAVO".to_string());
        patch.field_seven = Some("ID 123456".to_string());
        patch.template_one = Some(template.clone());

        assert_eq!(engine.write(&mut card, &patch), Outcome::SuccessEmpty);
    }

    // 3) read: всё вернулось, включая шаблон целиком
    {
        let mut card = CardImage::open(&path)?;
        match engine.read(&mut card) {
            Outcome::Success(record) => {
                assert_eq!(record.field_one.as_deref(), Some("ALICE"));
                assert_eq!(record.field_two.as_deref(), Some("COHORT 7"));
                assert_eq!(record.field_three.as_deref(), Some("B POSITIVE"));
                assert_eq!(record.field_four.as_deref(), Some("ENGINEERING"));
                assert_eq!(record.field_five.as_deref(), Some("ROOM 404"));
                assert_eq!(record.field_six.as_deref(), Some("BRAVO"));
                assert_eq!(record.field_seven.as_deref(), Some("ID 123456"));

                // 25 блоков == 400 байт, шаблон влезает ровно
                assert_eq!(record.template_one.as_deref(), Some(template.as_slice()));
                // второй слот не писали — magic-проба должна сказать "пусто"
                assert!(record.template_two.is_none());
            }
            Outcome::SuccessEmpty
            | Outcome::IncompatibleCard
            | Outcome::ConnectionLost
            | Outcome::Error(_) => panic!("expected read success"),
        }
    }

    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn read_of_blank_card_is_all_absent() -> Result<()> {
    let path = unique_path("blank");
    let mut card = CardImage::create(&path)?;
    let engine = Engine::new(VaultConfig::default());

    match engine.read(&mut card) {
        Outcome::Success(record) => assert!(record.is_empty()),
        Outcome::SuccessEmpty
        | Outcome::IncompatibleCard
        | Outcome::ConnectionLost
        | Outcome::Error(_) => panic!("expected read success"),
    }

    drop(card);
    std::fs::remove_file(&path)?;
    Ok(())
}

fn unique_path(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tv-{}-{}-{}.card", prefix, pid, t))
}

/// Шаблон: magic-заголовок + псевдослучайное тело фиксированного сида.
fn build_template(len: usize, seed: u8) -> Vec<u8> {
    let mut v = Vec::with_capacity(len);
    v.extend_from_slice(b"FMR");
    let mut rng = oorandom::Rand32::new(seed as u64);
    while v.len() < len {
        v.push(rng.rand_range(0..256) as u8);
    }
    v
}
