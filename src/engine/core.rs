//! engine/core — каркас транзакции.
//!
//! Последовательность одинакова для всех трёх операций:
//! Connecting -> GateCheck -> тело (read/write/format) -> Disconnecting.
//! Канал закрывается на любом пути выхода; ошибка самого close глотается
//! (best-effort release).
//!
//! Маппинг сбоев:
//! - отказ auth на gate-блоке -> IncompatibleCard (поля не тронуты);
//! - std::io::Error в цепочке причин -> ConnectionLost;
//! - всё остальное -> Error(message).
//! Авторетраев нет ни на одном уровне: повтор — решение вызывающего.

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::auth::authenticate;
use crate::config::VaultConfig;
use crate::metrics::{
    record_tx_connection_lost, record_tx_error, record_tx_format_ok, record_tx_incompatible,
    record_tx_read_ok, record_tx_write_ok,
};
use crate::record::CardRecord;
use crate::transport::CardTransport;

use super::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Read,
    Write,
    Format,
}

impl Op {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Op::Read => "read",
            Op::Write => "write",
            Op::Format => "format",
        }
    }
}

/// Движок транзакций: три входные точки — read / write / format.
#[derive(Debug, Clone)]
pub struct Engine {
    pub(crate) cfg: VaultConfig,
}

impl Engine {
    pub fn new(cfg: VaultConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &VaultConfig {
        &self.cfg
    }

    /// Прочитать все девять полей карты в CardRecord.
    pub fn read(&self, transport: &mut dyn CardTransport) -> Outcome {
        self.run(transport, Op::Read, |eng, t| eng.read_fields(t))
    }

    /// Записать sparse-патч: присутствующие поля пишутся, отсутствующие
    /// байты на карте не трогают.
    pub fn write(&self, transport: &mut dyn CardTransport, patch: &CardRecord) -> Outcome {
        self.run(transport, Op::Write, |eng, t| eng.write_fields(t, patch))
    }

    /// Обнулить все записываемые блоки (best-effort sweep).
    pub fn format(&self, transport: &mut dyn CardTransport) -> Outcome {
        self.run(transport, Op::Format, |eng, t| eng.zero_blocks(t))
    }

    fn run<F>(&self, transport: &mut dyn CardTransport, op: Op, body: F) -> Outcome
    where
        F: FnOnce(&Engine, &mut dyn CardTransport) -> Result<Outcome>,
    {
        info!("{}: transaction start", op.label());
        let res = self.run_inner(transport, op, body);

        // Disconnecting: гарантированный best-effort release.
        if transport.is_connected() {
            if let Err(e) = transport.close() {
                debug!("{}: close failed (ignored): {:#}", op.label(), e);
            }
        }

        let outcome = match res {
            Ok(outcome) => outcome,
            Err(e) => {
                if is_io_fault(&e) {
                    warn!("{}: connection lost: {:#}", op.label(), e);
                    Outcome::ConnectionLost
                } else {
                    error!("{}: failed: {:#}", op.label(), e);
                    Outcome::Error(format!("{:#}", e))
                }
            }
        };

        match &outcome {
            Outcome::Success(_) | Outcome::SuccessEmpty => match op {
                Op::Read => record_tx_read_ok(),
                Op::Write => record_tx_write_ok(),
                Op::Format => record_tx_format_ok(),
            },
            Outcome::IncompatibleCard => record_tx_incompatible(),
            Outcome::ConnectionLost => record_tx_connection_lost(),
            Outcome::Error(_) => record_tx_error(),
        }
        info!("{}: {}", op.label(), outcome);
        outcome
    }

    fn run_inner<F>(&self, transport: &mut dyn CardTransport, op: Op, body: F) -> Result<Outcome>
    where
        F: FnOnce(&Engine, &mut dyn CardTransport) -> Result<Outcome>,
    {
        transport.connect().context("connect")?;
        debug!("{}: connected", op.label());

        // GateCheck: одна auth-проба по известному блоку до любого доступа
        // к полям — незнакомую раскладку не трогаем вообще.
        if !authenticate(transport, self.cfg.gate_block, &self.cfg.key_a) {
            warn!(
                "{}: gate check failed on block {} - incompatible card",
                op.label(),
                self.cfg.gate_block
            );
            return Ok(Outcome::IncompatibleCard);
        }
        debug!("{}: gate check passed (block {})", op.label(), self.cfg.gate_block);

        body(self, transport)
    }
}

/// std::io::Error в любой точке цепочки причин — сбой канала.
fn is_io_fault(e: &anyhow::Error) -> bool {
    e.chain()
        .any(|cause| cause.downcast_ref::<std::io::Error>().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BLOCK_SIZE;
    use anyhow::anyhow;

    /// Сценарный транспорт: считает вызовы, умеет ронять connect и gate.
    #[derive(Default)]
    struct Scripted {
        connected: bool,
        gate_ok: bool,
        fail_connect_io: bool,
        fail_connect_other: bool,
        closes: usize,
        reads: usize,
        writes: usize,
    }

    impl CardTransport for Scripted {
        fn connect(&mut self) -> Result<()> {
            if self.fail_connect_io {
                return Err(anyhow::Error::new(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "tag left the field",
                )))
                .context("connect");
            }
            if self.fail_connect_other {
                return Err(anyhow!("not a supported tag"));
            }
            self.connected = true;
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            self.connected = false;
            self.closes += 1;
            Ok(())
        }
        fn is_connected(&self) -> bool {
            self.connected
        }
        fn block_to_sector(&self, block: u8) -> u8 {
            block / 4
        }
        fn authenticate_sector_with_key_a(&mut self, _sector: u8, _key: &[u8; 6]) -> Result<bool> {
            Ok(self.gate_ok)
        }
        fn read_block(&mut self, _block: u8) -> Result<[u8; BLOCK_SIZE]> {
            self.reads += 1;
            Ok([0u8; BLOCK_SIZE])
        }
        fn write_block(&mut self, _block: u8, _data: &[u8; BLOCK_SIZE]) -> Result<()> {
            self.writes += 1;
            Ok(())
        }
    }

    fn engine() -> Engine {
        Engine::new(VaultConfig::default())
    }

    #[test]
    fn gate_failure_touches_nothing_and_closes() {
        let mut t = Scripted {
            gate_ok: false,
            ..Default::default()
        };
        let out = engine().read(&mut t);
        assert_eq!(out, Outcome::IncompatibleCard);
        assert_eq!(t.reads, 0);
        assert_eq!(t.writes, 0);
        assert_eq!(t.closes, 1);
        assert!(!t.is_connected());
    }

    #[test]
    fn io_fault_maps_to_connection_lost() {
        let mut t = Scripted {
            fail_connect_io: true,
            ..Default::default()
        };
        let out = engine().format(&mut t);
        assert_eq!(out, Outcome::ConnectionLost);
    }

    #[test]
    fn other_fault_maps_to_error() {
        let mut t = Scripted {
            fail_connect_other: true,
            ..Default::default()
        };
        match engine().format(&mut t) {
            Outcome::Error(msg) => assert!(msg.contains("not a supported tag")),
            Outcome::Success(_)
            | Outcome::SuccessEmpty
            | Outcome::IncompatibleCard
            | Outcome::ConnectionLost => panic!("expected Error outcome"),
        }
    }

    #[test]
    fn happy_read_closes_exactly_once() {
        let mut t = Scripted {
            gate_ok: true,
            ..Default::default()
        };
        let out = engine().read(&mut t);
        assert!(out.is_success());
        assert_eq!(t.closes, 1);
        assert!(!t.is_connected());
    }
}
