//! record — декодированная сущность карты.
//!
//! CardRecord — девять опциональных полей: семь текстовых и два бинарных
//! шаблона. Семантика sparse patch: при записи на карту уходят только
//! присутствующие поля, отсутствующие (None) байты на карте не трогают.
//! Живёт в пределах одной транзакции: построен read'ом либо собран
//! вызывающим кодом как патч для write.

use serde::{Deserialize, Serialize};

use crate::layout::FieldId;

/// Девять опциональных полей карты. None — поле не заполнено (или для
/// шаблонов — magic-проба не прошла).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_one: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_two: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_three: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_four: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_five: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_six: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field_seven: Option<String>,

    // Шаблоны в JSON кодируются base64-строкой.
    #[serde(with = "b64", skip_serializing_if = "Option::is_none", default)]
    pub template_one: Option<Vec<u8>>,
    #[serde(with = "b64", skip_serializing_if = "Option::is_none", default)]
    pub template_two: Option<Vec<u8>>,
}

impl CardRecord {
    /// Ни одного присутствующего поля.
    pub fn is_empty(&self) -> bool {
        FieldId::ALL.iter().all(|&id| !self.has(id))
    }

    /// Присутствует ли поле в записи/патче.
    pub fn has(&self, id: FieldId) -> bool {
        match id {
            FieldId::TemplateOne | FieldId::TemplateTwo => self.binary(id).is_some(),
            _ => self.text(id).is_some(),
        }
    }

    /// Текстовое значение поля. Для бинарных слотов всегда None.
    pub fn text(&self, id: FieldId) -> Option<&str> {
        match id {
            FieldId::One => self.field_one.as_deref(),
            FieldId::Two => self.field_two.as_deref(),
            FieldId::Three => self.field_three.as_deref(),
            FieldId::Four => self.field_four.as_deref(),
            FieldId::Five => self.field_five.as_deref(),
            FieldId::Six => self.field_six.as_deref(),
            FieldId::Seven => self.field_seven.as_deref(),
            FieldId::TemplateOne | FieldId::TemplateTwo => None,
        }
    }

    /// Бинарное значение слота. Для текстовых полей всегда None.
    pub fn binary(&self, id: FieldId) -> Option<&[u8]> {
        match id {
            FieldId::TemplateOne => self.template_one.as_deref(),
            FieldId::TemplateTwo => self.template_two.as_deref(),
            _ => None,
        }
    }

    /// Установить текстовое поле. Паникует на бинарном слоте — это ошибка
    /// вызывающего кода, а не данных.
    pub fn set_text(&mut self, id: FieldId, value: Option<String>) {
        let slot = match id {
            FieldId::One => &mut self.field_one,
            FieldId::Two => &mut self.field_two,
            FieldId::Three => &mut self.field_three,
            FieldId::Four => &mut self.field_four,
            FieldId::Five => &mut self.field_five,
            FieldId::Six => &mut self.field_six,
            FieldId::Seven => &mut self.field_seven,
            FieldId::TemplateOne | FieldId::TemplateTwo => {
                panic!("set_text on binary slot {:?}", id)
            }
        };
        *slot = value;
    }

    /// Установить бинарный слот. Паникует на текстовом поле.
    pub fn set_binary(&mut self, id: FieldId, value: Option<Vec<u8>>) {
        let slot = match id {
            FieldId::TemplateOne => &mut self.template_one,
            FieldId::TemplateTwo => &mut self.template_two,
            _ => panic!("set_binary on text field {:?}", id),
        };
        *slot = value;
    }
}

/// serde-хелпер: Option<Vec<u8>> <-> base64-строка в JSON.
mod b64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(bytes) => {
                s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let opt: Option<String> = Option::deserialize(d)?;
        match opt {
            Some(text) => base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let r = CardRecord::default();
        assert!(r.is_empty());
        for id in FieldId::ALL {
            assert!(!r.has(id));
        }
    }

    #[test]
    fn accessors_by_field_id() {
        let mut r = CardRecord::default();
        r.set_text(FieldId::Three, Some("ALICE".to_string()));
        r.set_binary(FieldId::TemplateTwo, Some(vec![1, 2, 3]));

        assert_eq!(r.text(FieldId::Three), Some("ALICE"));
        assert_eq!(r.binary(FieldId::TemplateTwo), Some(&[1u8, 2, 3][..]));
        assert!(r.text(FieldId::TemplateTwo).is_none());
        assert!(r.binary(FieldId::Three).is_none());
        assert!(!r.is_empty());
    }

    #[test]
    fn json_round_trip_with_base64_templates() {
        let mut r = CardRecord::default();
        r.field_one = Some("ALICE".to_string());
        r.template_two = Some(vec![0x46, 0x4D, 0x52, 0x00, 0x7F]);

        let json = serde_json::to_string(&r).expect("serialize");
        assert!(json.contains("\"field_one\":\"ALICE\""));
        // Отсутствующие поля не сериализуются.
        assert!(!json.contains("field_two"));
        assert!(!json.contains("template_one"));

        let back: CardRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, r);
    }
}
