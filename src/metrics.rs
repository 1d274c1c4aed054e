//! Lightweight global metrics for TagVault.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Sector auth
//! - Block I/O (read/write + per-block degradation)
//! - Presence probe
//! - Codec (усечения текста)
//! - Transactions (итоги по терминальным исходам)

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Sector auth -----
static AUTH_ATTEMPTS: AtomicU64 = AtomicU64::new(0);
static AUTH_FAILURES: AtomicU64 = AtomicU64::new(0);

// ----- Block I/O -----
static BLOCKS_READ: AtomicU64 = AtomicU64::new(0);
static BLOCKS_WRITTEN: AtomicU64 = AtomicU64::new(0);
static BLOCK_READ_ERRORS: AtomicU64 = AtomicU64::new(0);
static BLOCK_WRITE_ERRORS: AtomicU64 = AtomicU64::new(0);
static TRAILER_SKIPS: AtomicU64 = AtomicU64::new(0);

// ----- Presence probe -----
static PROBE_HITS: AtomicU64 = AtomicU64::new(0);
static PROBE_MISSES: AtomicU64 = AtomicU64::new(0);

// ----- Codec -----
static TEXT_TRUNCATIONS: AtomicU64 = AtomicU64::new(0);

// ----- Transactions -----
static TX_READ_OK: AtomicU64 = AtomicU64::new(0);
static TX_WRITE_OK: AtomicU64 = AtomicU64::new(0);
static TX_FORMAT_OK: AtomicU64 = AtomicU64::new(0);
static TX_INCOMPATIBLE: AtomicU64 = AtomicU64::new(0);
static TX_CONNECTION_LOST: AtomicU64 = AtomicU64::new(0);
static TX_ERRORS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // Sector auth
    pub auth_attempts: u64,
    pub auth_failures: u64,

    // Block I/O
    pub blocks_read: u64,
    pub blocks_written: u64,
    pub block_read_errors: u64,
    pub block_write_errors: u64,
    pub trailer_skips: u64,

    // Presence probe
    pub probe_hits: u64,
    pub probe_misses: u64,

    // Codec
    pub text_truncations: u64,

    // Transactions
    pub tx_read_ok: u64,
    pub tx_write_ok: u64,
    pub tx_format_ok: u64,
    pub tx_incompatible: u64,
    pub tx_connection_lost: u64,
    pub tx_errors: u64,
}

impl MetricsSnapshot {
    pub fn auth_failure_ratio(&self) -> f64 {
        if self.auth_attempts == 0 {
            0.0
        } else {
            self.auth_failures as f64 / self.auth_attempts as f64
        }
    }
}

// ----- Recorders (Sector auth) -----
pub fn record_auth_attempt() {
    AUTH_ATTEMPTS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_auth_failure() {
    AUTH_FAILURES.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Block I/O) -----
pub fn record_block_read() {
    BLOCKS_READ.fetch_add(1, Ordering::Relaxed);
}
pub fn record_block_written() {
    BLOCKS_WRITTEN.fetch_add(1, Ordering::Relaxed);
}
pub fn record_block_read_error() {
    BLOCK_READ_ERRORS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_block_write_error() {
    BLOCK_WRITE_ERRORS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_trailer_skip() {
    TRAILER_SKIPS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Presence probe) -----
pub fn record_probe_hit() {
    PROBE_HITS.fetch_add(1, Ordering::Relaxed);
}
pub fn record_probe_miss() {
    PROBE_MISSES.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Codec) -----
pub fn record_text_truncation() {
    TEXT_TRUNCATIONS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Transactions) -----
pub fn record_tx_read_ok() {
    TX_READ_OK.fetch_add(1, Ordering::Relaxed);
}
pub fn record_tx_write_ok() {
    TX_WRITE_OK.fetch_add(1, Ordering::Relaxed);
}
pub fn record_tx_format_ok() {
    TX_FORMAT_OK.fetch_add(1, Ordering::Relaxed);
}
pub fn record_tx_incompatible() {
    TX_INCOMPATIBLE.fetch_add(1, Ordering::Relaxed);
}
pub fn record_tx_connection_lost() {
    TX_CONNECTION_LOST.fetch_add(1, Ordering::Relaxed);
}
pub fn record_tx_error() {
    TX_ERRORS.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        auth_attempts: AUTH_ATTEMPTS.load(Ordering::Relaxed),
        auth_failures: AUTH_FAILURES.load(Ordering::Relaxed),

        blocks_read: BLOCKS_READ.load(Ordering::Relaxed),
        blocks_written: BLOCKS_WRITTEN.load(Ordering::Relaxed),
        block_read_errors: BLOCK_READ_ERRORS.load(Ordering::Relaxed),
        block_write_errors: BLOCK_WRITE_ERRORS.load(Ordering::Relaxed),
        trailer_skips: TRAILER_SKIPS.load(Ordering::Relaxed),

        probe_hits: PROBE_HITS.load(Ordering::Relaxed),
        probe_misses: PROBE_MISSES.load(Ordering::Relaxed),

        text_truncations: TEXT_TRUNCATIONS.load(Ordering::Relaxed),

        tx_read_ok: TX_READ_OK.load(Ordering::Relaxed),
        tx_write_ok: TX_WRITE_OK.load(Ordering::Relaxed),
        tx_format_ok: TX_FORMAT_OK.load(Ordering::Relaxed),
        tx_incompatible: TX_INCOMPATIBLE.load(Ordering::Relaxed),
        tx_connection_lost: TX_CONNECTION_LOST.load(Ordering::Relaxed),
        tx_errors: TX_ERRORS.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    AUTH_ATTEMPTS.store(0, Ordering::Relaxed);
    AUTH_FAILURES.store(0, Ordering::Relaxed);

    BLOCKS_READ.store(0, Ordering::Relaxed);
    BLOCKS_WRITTEN.store(0, Ordering::Relaxed);
    BLOCK_READ_ERRORS.store(0, Ordering::Relaxed);
    BLOCK_WRITE_ERRORS.store(0, Ordering::Relaxed);
    TRAILER_SKIPS.store(0, Ordering::Relaxed);

    PROBE_HITS.store(0, Ordering::Relaxed);
    PROBE_MISSES.store(0, Ordering::Relaxed);

    TEXT_TRUNCATIONS.store(0, Ordering::Relaxed);

    TX_READ_OK.store(0, Ordering::Relaxed);
    TX_WRITE_OK.store(0, Ordering::Relaxed);
    TX_FORMAT_OK.store(0, Ordering::Relaxed);
    TX_INCOMPATIBLE.store(0, Ordering::Relaxed);
    TX_CONNECTION_LOST.store(0, Ordering::Relaxed);
    TX_ERRORS.store(0, Ordering::Relaxed);
}
