//! Centralized configuration for TagVault.
//!
//! Goals:
//! - Single place for the deployment secrets instead of a language-level
//!   singleton: the Key-A value is injected at engine construction and can
//!   be swapped per deployment (or per test).
//! - Keep env-based overrides: VaultConfig::from_env() reads TV_* vars.
//!
//! Env vars:
//! - TV_KEY_A      — 12 hex chars, overrides the transport Key-A.
//! - TV_GATE_BLOCK — decimal block index for the compatibility probe.

use std::fmt;

use crate::consts::{GATE_BLOCK, KEY_A_DEFAULT, MAGIC_HEADER};
use crate::util::parse_key_hex;

/// Top-level configuration consumed by the transaction engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultConfig {
    /// Key-A used for every sector (single shared key, no derivation).
    pub key_a: [u8; 6],

    /// Block authenticated by the gate check before any field access.
    pub gate_block: u8,

    /// 3-byte presence marker for the binary slots.
    pub magic: [u8; 3],
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            key_a: KEY_A_DEFAULT,
            gate_block: GATE_BLOCK,
            magic: MAGIC_HEADER,
        }
    }
}

impl VaultConfig {
    /// Load configuration from environment variables on top of the defaults.
    /// Malformed values are ignored (the deployed constants win).
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("TV_KEY_A") {
            match parse_key_hex(v.trim()) {
                Ok(key) => cfg.key_a = key,
                Err(e) => log::warn!("TV_KEY_A ignored: {}", e),
            }
        }

        if let Ok(v) = std::env::var("TV_GATE_BLOCK") {
            if let Ok(n) = v.trim().parse::<u8>() {
                cfg.gate_block = n;
            }
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_key_a(mut self, key: [u8; 6]) -> Self {
        self.key_a = key;
        self
    }

    pub fn with_gate_block(mut self, block: u8) -> Self {
        self.gate_block = block;
        self
    }

    pub fn with_magic(mut self, magic: [u8; 3]) -> Self {
        self.magic = magic;
        self
    }
}

impl fmt::Display for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Ключ не печатаем даже в debug-выводе.
        write!(
            f,
            "VaultConfig {{ key_a: <redacted>, gate_block: {}, magic: {:02x}{:02x}{:02x} }}",
            self.gate_block, self.magic[0], self.magic[1], self.magic[2]
        )
    }
}
