//! layout — отображение логических полей на физические блоки.
//!
//! Содержит:
//! - FieldId: закрытый список из девяти полей в фиксированном порядке обхода.
//! - blocks()/capacity(): группа блоков поля и её ёмкость в байтах.
//! - is_trailer(): предикат трейлера сектора, (b + 1) % 4 == 0.
//! - writable_universe(): отсортированное объединение всех блоков без
//!   дубликатов и без трейлеров — его обходит только format.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::consts::{
    BLOCKS_FIELD_FIVE, BLOCKS_FIELD_FOUR, BLOCKS_FIELD_ONE, BLOCKS_FIELD_SEVEN, BLOCKS_FIELD_SIX,
    BLOCKS_FIELD_THREE, BLOCKS_FIELD_TWO, BLOCKS_TEMPLATE_ONE, BLOCKS_TEMPLATE_TWO, BLOCK_SIZE,
};

/// Девять логических полей карты: семь текстовых и два бинарных слота.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    TemplateOne,
    TemplateTwo,
}

impl FieldId {
    /// Фиксированный порядок обхода для read/write. Между полями зависимостей
    /// нет, порядок влияет только на читаемость логов.
    pub const ALL: [FieldId; 9] = [
        FieldId::One,
        FieldId::Two,
        FieldId::Three,
        FieldId::Four,
        FieldId::Five,
        FieldId::Six,
        FieldId::Seven,
        FieldId::TemplateOne,
        FieldId::TemplateTwo,
    ];

    /// Группа физических блоков поля. Никогда не пуста и не содержит трейлеров.
    pub fn blocks(self) -> &'static [u8] {
        match self {
            FieldId::One => BLOCKS_FIELD_ONE,
            FieldId::Two => BLOCKS_FIELD_TWO,
            FieldId::Three => BLOCKS_FIELD_THREE,
            FieldId::Four => BLOCKS_FIELD_FOUR,
            FieldId::Five => BLOCKS_FIELD_FIVE,
            FieldId::Six => BLOCKS_FIELD_SIX,
            FieldId::Seven => BLOCKS_FIELD_SEVEN,
            FieldId::TemplateOne => BLOCKS_TEMPLATE_ONE,
            FieldId::TemplateTwo => BLOCKS_TEMPLATE_TWO,
        }
    }

    /// Бинарный слот (шаблон) или текстовое поле.
    #[inline]
    pub fn is_binary(self) -> bool {
        matches!(self, FieldId::TemplateOne | FieldId::TemplateTwo)
    }

    /// Ёмкость поля в байтах.
    #[inline]
    pub fn capacity(self) -> usize {
        self.blocks().len() * BLOCK_SIZE
    }
}

/// Трейлер сектора: последний блок четвёрки, хранит ключи и access bits.
/// Контентом не адресуется никогда.
#[inline]
pub fn is_trailer(block: u8) -> bool {
    (block as usize + 1) % 4 == 0
}

/// Все записываемые блоки (для format): объединение групп всех полей,
/// по возрастанию, без дубликатов. Трейлеры исключены конструктивно.
pub fn writable_universe() -> &'static [u8] {
    static UNIVERSE: OnceLock<Vec<u8>> = OnceLock::new();
    UNIVERSE.get_or_init(|| {
        let mut v: Vec<u8> = FieldId::ALL
            .iter()
            .flat_map(|f| f.blocks().iter().copied())
            .filter(|&b| !is_trailer(b))
            .collect();
        v.sort_unstable();
        v.dedup();
        v
    })
}
