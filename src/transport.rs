//! transport — контракт железного канала к карте.
//!
//! Сеам между движком транзакций и низкоуровневой реализацией sector auth /
//! block transfer (железо или эмуляция поверх файла, см. image.rs).
//!
//! Модель сессии:
//! - connect()/close(): канал открывается на время ровно одной транзакции и
//!   обязан быть закрыт на любом пути выхода.
//! - authenticate_sector_with_key_a(): Ok(false) — ключ не подошёл (штатное,
//!   частое состояние), Err — отказ самого канала.
//! - read_block()/write_block(): работают строго по 16 байт; требуют живой
//!   auth-сессии на сектор, которую может инвалидировать любой промежуточный
//!   I/O — поэтому движок аутентифицируется перед каждым доступом.

use anyhow::Result;

use crate::consts::BLOCK_SIZE;

/// Один подключённый канал к одной физической карте. Эксклюзивное владение
/// на время транзакции; параллельного доступа нет by contract (см. fs2-lock
/// в image.rs).
pub trait CardTransport {
    /// Открыть канал к карте.
    fn connect(&mut self) -> Result<()>;

    /// Закрыть канал. Движок зовёт best-effort и игнорирует ошибку.
    fn close(&mut self) -> Result<()>;

    /// Открыт ли канал.
    fn is_connected(&self) -> bool;

    /// Сектор, содержащий блок (зависит от геометрии карты).
    fn block_to_sector(&self, block: u8) -> u8;

    /// Key-A аутентификация сектора. Ok(false) — ключ отвергнут.
    fn authenticate_sector_with_key_a(&mut self, sector: u8, key: &[u8; 6]) -> Result<bool>;

    /// Прочитать один 16-байтовый блок.
    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE]>;

    /// Записать один 16-байтовый блок.
    fn write_block(&mut self, block: u8, data: &[u8; BLOCK_SIZE]) -> Result<()>;
}
