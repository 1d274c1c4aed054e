//! engine — движок транзакций карты.
//!
//! Разделение по подмодулям:
//! - core.rs   — Engine, каркас транзакции (connect -> gate check -> тело ->
//!               disconnect) и маппинг сбоев в терминальные исходы.
//! - read.rs   — чтение девяти полей в CardRecord (best-effort по блокам).
//! - write.rs  — запись sparse-патча (поля независимы, блоки — нет).
//! - format.rs — обнуление всех записываемых блоков (best-effort sweep).
//! - report.rs — накопительный отчёт per-field/per-block вместо молчаливого
//!               подавления исключений.

pub mod core;
pub mod format;
pub mod read;
pub mod report;
pub mod write;

use std::fmt;

use crate::record::CardRecord;

pub use self::core::Engine;
pub use self::report::{BlockStatus, FieldReport, TxReport};

/// Терминальный исход транзакции. Закрытая сумма: на каждом call site
/// матчится исчерпывающе, без catch-all ветки.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Чтение прошло, данные собраны.
    Success(CardRecord),
    /// Запись/формат прошли; данных для вызывающего нет.
    SuccessEmpty,
    /// Gate check не прошёл: чужая раскладка, ни один блок не тронут.
    IncompatibleCard,
    /// I/O-сбой канала в ходе транзакции.
    ConnectionLost,
    /// Любой другой неожиданный сбой.
    Error(String),
}

impl Outcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_) | Outcome::SuccessEmpty)
    }
}

impl fmt::Display for Outcome {
    /// Короткое сообщение для пользователя; retry — забота вызывающего
    /// (обычно: приложить карту ещё раз).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => write!(f, "success"),
            Outcome::SuccessEmpty => write!(f, "done"),
            Outcome::IncompatibleCard => write!(f, "card is not compatible"),
            Outcome::ConnectionLost => write!(f, "connection lost"),
            Outcome::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}
