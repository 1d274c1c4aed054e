//! auth — Key-A аутентификация сектора по индексу блока.
//!
//! Отказ auth — штатное и частое состояние (чужая карта, сорванная сессия),
//! поэтому здесь bool, а не Result: любой сбой канала тоже сводится к false.
//! Вызывается перед КАЖДЫМ доступом к блоку — промежуточный I/O может
//! инвалидировать сессию; повтор дёшев и идемпотентен.

use log::debug;

use crate::metrics::{record_auth_attempt, record_auth_failure};
use crate::transport::CardTransport;

/// Аутентифицировать сектор, содержащий `block`, ключом Key-A.
pub fn authenticate(transport: &mut dyn CardTransport, block: u8, key: &[u8; 6]) -> bool {
    record_auth_attempt();
    let sector = transport.block_to_sector(block);
    let ok = transport
        .authenticate_sector_with_key_a(sector, key)
        .unwrap_or_else(|e| {
            debug!("auth sector {} (block {}): transport fault: {:#}", sector, block, e);
            false
        });
    if !ok {
        record_auth_failure();
    }
    ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use crate::consts::BLOCK_SIZE;

    /// Минимальный транспорт: auth проходит только на чётных секторах,
    /// сектор 7 роняет канал.
    struct Scripted;

    impl CardTransport for Scripted {
        fn connect(&mut self) -> Result<()> {
            Ok(())
        }
        fn close(&mut self) -> Result<()> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            true
        }
        fn block_to_sector(&self, block: u8) -> u8 {
            block / 4
        }
        fn authenticate_sector_with_key_a(&mut self, sector: u8, _key: &[u8; 6]) -> Result<bool> {
            if sector == 7 {
                return Err(anyhow!("rf field lost"));
            }
            Ok(sector % 2 == 0)
        }
        fn read_block(&mut self, _block: u8) -> Result<[u8; BLOCK_SIZE]> {
            unreachable!()
        }
        fn write_block(&mut self, _block: u8, _data: &[u8; BLOCK_SIZE]) -> Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn maps_sector_and_swallows_faults() {
        let mut t = Scripted;
        let key = [0xFF; 6];
        assert!(authenticate(&mut t, 0, &key)); // sector 0
        assert!(!authenticate(&mut t, 4, &key)); // sector 1
        assert!(authenticate(&mut t, 10, &key)); // sector 2
        assert!(!authenticate(&mut t, 28, &key)); // sector 7 -> fault -> false
    }
}
