use anyhow::Result;
use std::path::PathBuf;

use TagVault::engine::{Engine, Outcome};
use TagVault::image::CardImage;
use TagVault::record::CardRecord;
use TagVault::VaultConfig;

fn read_record(engine: &Engine, card: &mut CardImage) -> CardRecord {
    match engine.read(card) {
        Outcome::Success(record) => record,
        Outcome::SuccessEmpty
        | Outcome::IncompatibleCard
        | Outcome::ConnectionLost
        | Outcome::Error(_) => panic!("expected read success"),
    }
}

#[test]
fn single_field_patch_leaves_others_untouched() -> Result<()> {
    let path = unique_path("patch");
    let engine = Engine::new(VaultConfig::default());
    let mut card = CardImage::create(&path)?;

    let mut full = CardRecord::default();
    full.field_one = Some("ALICE".to_string());
    full.field_two = Some("COHORT 7".to_string());
    full.field_three = Some("B POSITIVE".to_string());
    full.field_four = Some("ENGINEERING".to_string());
    assert_eq!(engine.write(&mut card, &full), Outcome::SuccessEmpty);

    // Патч только третьего поля.
    let mut patch = CardRecord::default();
    patch.field_three = Some("O NEGATIVE".to_string());
    assert_eq!(engine.write(&mut card, &patch), Outcome::SuccessEmpty);

    let record = read_record(&engine, &mut card);
    assert_eq!(record.field_three.as_deref(), Some("O NEGATIVE"));
    // Остальные поля сохранили прежние значения.
    assert_eq!(record.field_one.as_deref(), Some("ALICE"));
    assert_eq!(record.field_two.as_deref(), Some("COHORT 7"));
    assert_eq!(record.field_four.as_deref(), Some("ENGINEERING"));

    drop(card);
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn shorter_value_does_not_fully_shadow_longer_one() -> Result<()> {
    // Деплойное поведение: encode пишет только ceil(len/16) блоков, хвост
    // группы не трогается. Короткое значение поверх длинного оставляет
    // старые байты в дальних блоках — они дочитаются в значение.
    let path = unique_path("shadow");
    let engine = Engine::new(VaultConfig::default());
    let mut card = CardImage::create(&path)?;

    let mut patch = CardRecord::default();
    patch.field_one = Some("A".repeat(20)); // блоки 1 и 60
    assert_eq!(engine.write(&mut card, &patch), Outcome::SuccessEmpty);

    let mut patch = CardRecord::default();
    patch.field_one = Some("BOB".to_string()); // только блок 1
    assert_eq!(engine.write(&mut card, &patch), Outcome::SuccessEmpty);

    let record = read_record(&engine, &mut card);
    // Блок 60 всё ещё несёт хвост "AAAA" первого значения.
    assert_eq!(record.field_one.as_deref(), Some("BOBAAAA"));

    drop(card);
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn oversized_text_is_truncated_at_group_capacity() -> Result<()> {
    let path = unique_path("trunc");
    let engine = Engine::new(VaultConfig::default());
    let mut card = CardImage::create(&path)?;

    // Поле семь: 2 блока, 32 байта ёмкости.
    let long = "X".repeat(40);
    let mut patch = CardRecord::default();
    patch.field_seven = Some(long.clone());
    assert_eq!(engine.write(&mut card, &patch), Outcome::SuccessEmpty);

    let record = read_record(&engine, &mut card);
    assert_eq!(record.field_seven.as_deref(), Some(&long[..32]));

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
