//! util — общие мелкие хелперы (hex-разбор ключа, hex-dump).
//!
//! Задача: убрать дублирование простых функций между CLI и библиотекой.

use anyhow::{anyhow, Result};

/// Разобрать 6-байтовый Key-A из 12 hex-символов ("ffffffffffff").
pub fn parse_key_hex(s: &str) -> Result<[u8; 6]> {
    if s.len() != 12 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(anyhow!("key must be 12 hex chars, got '{}'", s));
    }
    let mut key = [0u8; 6];
    for (i, out) in key.iter_mut().enumerate() {
        let byte = &s[i * 2..i * 2 + 2];
        *out = u8::from_str_radix(byte, 16).map_err(|_| anyhow!("bad hex byte '{}'", byte))?;
    }
    Ok(key)
}

/// Hex-представление среза ("0a ff 21 ...").
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:02x}", b));
    }
    out
}
