//! codec — кодирование/декодирование полей в 16-байтовые блоки.
//!
//! Текст: UTF-8 + чистящий фильтр при чтении (буквы/цифры/пробел, trim) —
//! неиспользованная ёмкость и остатки ключей декодируются в мусор, который
//! не должен попадать в логическое значение.
//! Бинарные слоты: сырые байты без чистки, каждый бит значим.
//!
//! encode_* возвращает только ceil(len/16) чанков: блоки за пределами данных
//! не трогаются вообще. Байты сверх ёмкости группы молча отрезаются, но факт
//! усечения возвращается флагом (Encoded::truncated) и попадает в метрики.

use log::debug;

use crate::auth::authenticate;
use crate::consts::BLOCK_SIZE;
use crate::metrics::{record_probe_hit, record_probe_miss};
use crate::transport::CardTransport;

/// Результат кодирования поля в блочные payload'ы.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// Чанки по 16 байт, последний дополнен нулями.
    pub payloads: Vec<[u8; BLOCK_SIZE]>,
    /// Данные не влезли в ёмкость группы и были отрезаны.
    pub truncated: bool,
}

/// Чистящий фильтр текста: оставить буквы, цифры и пробел, обрезать края.
pub fn clean_text(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect();
    kept.trim().to_string()
}

/// Склеить блоки в порядке группы и декодировать как текст (с чисткой).
pub fn decode_text(payloads: &[[u8; BLOCK_SIZE]]) -> String {
    let raw = decode_binary(payloads);
    clean_text(&String::from_utf8_lossy(&raw))
}

/// Сырая конкатенация блоков, без чистки.
pub fn decode_binary(payloads: &[[u8; BLOCK_SIZE]]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payloads.len() * BLOCK_SIZE);
    for p in payloads {
        out.extend_from_slice(p);
    }
    out
}

/// Закодировать текст в payload'ы для группы из `block_count` блоков.
pub fn encode_text(value: &str, block_count: usize) -> Encoded {
    encode_binary(value.as_bytes(), block_count)
}

/// Разбить байты на 16-байтовые чанки под группу из `block_count` блоков.
/// Последний неполный чанк дополняется нулями; хвост сверх ёмкости отрезается.
pub fn encode_binary(data: &[u8], block_count: usize) -> Encoded {
    let capacity = block_count * BLOCK_SIZE;
    let truncated = data.len() > capacity;
    let data = &data[..data.len().min(capacity)];

    let mut payloads = Vec::with_capacity(data.len().div_ceil(BLOCK_SIZE));
    for chunk in data.chunks(BLOCK_SIZE) {
        let mut block = [0u8; BLOCK_SIZE];
        block[..chunk.len()].copy_from_slice(chunk);
        payloads.push(block);
    }
    Encoded { payloads, truncated }
}

/// Проба присутствия бинарного слота: auth + чтение ровно одного блока,
/// сравнение первых трёх байт с magic-заголовком. Любой сбой — "слота нет",
/// ошибки наружу не выходят.
pub fn probe_presence(
    transport: &mut dyn CardTransport,
    first_block: u8,
    key: &[u8; 6],
    magic: &[u8; 3],
) -> bool {
    if !authenticate(transport, first_block, key) {
        record_probe_miss();
        return false;
    }
    let present = match transport.read_block(first_block) {
        Ok(payload) => &payload[..magic.len()] == magic,
        Err(e) => {
            debug!("probe block {}: read fault: {:#}", first_block, e);
            false
        }
    };
    if present {
        record_probe_hit();
    } else {
        record_probe_miss();
    }
    present
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(fill: &[u8]) -> [u8; BLOCK_SIZE] {
        let mut b = [0u8; BLOCK_SIZE];
        b[..fill.len()].copy_from_slice(fill);
        b
    }

    #[test]
    fn clean_keeps_letters_digits_spaces() {
        assert_eq!(clean_text("ALICE\u{0}\u{1}\u{fffd}"), "ALICE");
        assert_eq!(clean_text("  A B 7  "), "A B 7");
        assert_eq!(clean_text("\u{0}\u{0}"), "");
        // Unicode-буквы проходят фильтр
        assert_eq!(clean_text("Ёлка-2024!"), "Ёлка2024");
    }

    #[test]
    fn text_round_trip_is_clean_fixed_point() {
        // Пять байт на группе из трёх блоков (48 байт ёмкости).
        let enc = encode_text("ALICE", 3);
        assert!(!enc.truncated);
        assert_eq!(enc.payloads.len(), 1);
        assert_eq!(decode_text(&enc.payloads), "ALICE");

        let enc = encode_text("JOHN SMITH 42", 2);
        assert_eq!(decode_text(&enc.payloads), "JOHN SMITH 42");
    }

    #[test]
    fn encode_produces_only_needed_chunks() {
        assert_eq!(encode_text("", 3).payloads.len(), 0);
        assert_eq!(encode_text("A", 3).payloads.len(), 1);
        assert_eq!(encode_binary(&[7u8; 16], 3).payloads.len(), 1);
        assert_eq!(encode_binary(&[7u8; 17], 3).payloads.len(), 2);
        assert_eq!(encode_binary(&[7u8; 48], 3).payloads.len(), 3);
    }

    #[test]
    fn encode_zero_pads_last_chunk() {
        let enc = encode_text("ALICE", 3);
        let mut expected = [0u8; BLOCK_SIZE];
        expected[..5].copy_from_slice(b"ALICE");
        assert_eq!(enc.payloads[0], expected);
    }

    #[test]
    fn overflow_is_truncated_and_flagged() {
        let data = vec![0x5Au8; 70];
        let enc = encode_binary(&data, 4); // ёмкость 64
        assert!(enc.truncated);
        assert_eq!(enc.payloads.len(), 4);
        assert_eq!(decode_binary(&enc.payloads), &data[..64]);

        // ровно в ёмкость — без флага
        let enc = encode_binary(&data[..64], 4);
        assert!(!enc.truncated);
    }

    #[test]
    fn binary_round_trip_no_cleaning() {
        let data: Vec<u8> = (0u8..=255).collect();
        let enc = encode_binary(&data, 16);
        assert!(!enc.truncated);
        assert_eq!(decode_binary(&enc.payloads), data);
    }

    #[test]
    fn decode_text_drops_padding_artifacts() {
        // Три блока: значение + нулевое дополнение + мусор от соседей.
        let payloads = [block(b"ALICE"), block(&[0u8; 16]), block(&[0x07, 0x80, 0x69])];
        assert_eq!(decode_text(&payloads), "ALICE");
    }
}
