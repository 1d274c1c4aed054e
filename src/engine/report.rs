//! engine/report — накопительный результат блочных операций.
//!
//! Каждая операция над блоком кладёт свой исход в отчёт; агрегат решает
//! судьбу поля/транзакции и уходит в debug-лог одной JSON-строкой. Это
//! замена неявному catch-and-log внутри циклов: деградация видна целиком.

use serde::Serialize;

use crate::layout::FieldId;

/// Исход одной операции над одним блоком.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStatus {
    Ok,
    AuthFailed,
    IoFailed,
    /// Трейлер в группе поля: пропущен целиком, данные в него не пишутся.
    TrailerSkipped,
}

/// Отчёт по одному полю: исходы блоков в порядке группы + флаг усечения.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub field: FieldId,
    pub blocks: Vec<(u8, BlockStatus)>,
    /// Данные не влезли в ёмкость группы (только для write).
    pub truncated: bool,
    /// Слот пропущен по magic-пробе (только для бинарных полей в read).
    pub probe_missed: bool,
}

impl FieldReport {
    pub fn new(field: FieldId) -> Self {
        Self {
            field,
            blocks: Vec::new(),
            truncated: false,
            probe_missed: false,
        }
    }

    #[inline]
    pub fn record(&mut self, block: u8, status: BlockStatus) {
        self.blocks.push((block, status));
    }

    pub fn ok_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|(_, s)| *s == BlockStatus::Ok)
            .count()
    }

    pub fn degraded(&self) -> bool {
        self.blocks.iter().any(|(_, s)| *s != BlockStatus::Ok)
    }
}

/// Отчёт транзакции целиком.
#[derive(Debug, Clone, Serialize)]
pub struct TxReport {
    pub op: &'static str,
    pub fields: Vec<FieldReport>,
}

impl TxReport {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            fields: Vec::new(),
        }
    }

    pub fn push(&mut self, field: FieldReport) {
        self.fields.push(field);
    }

    pub fn degraded(&self) -> bool {
        self.fields.iter().any(|f| f.degraded() || f.truncated)
    }

    /// Одна JSON-строка для debug-лога.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_block_outcomes() {
        let mut fr = FieldReport::new(FieldId::One);
        fr.record(1, BlockStatus::Ok);
        fr.record(60, BlockStatus::AuthFailed);
        fr.record(26, BlockStatus::Ok);
        assert_eq!(fr.ok_blocks(), 2);
        assert!(fr.degraded());

        let mut tx = TxReport::new("read");
        tx.push(fr);
        assert!(tx.degraded());
        let json = tx.to_json();
        assert!(json.contains("\"op\":\"read\""));
        assert!(json.contains("auth_failed"));
    }

    #[test]
    fn clean_report_is_not_degraded() {
        let mut fr = FieldReport::new(FieldId::Seven);
        fr.record(8, BlockStatus::Ok);
        fr.record(62, BlockStatus::Ok);
        let mut tx = TxReport::new("write");
        tx.push(fr);
        assert!(!tx.degraded());
    }
}
