//! engine/write — запись sparse-патча на карту.
//!
//! Семантика намеренно несимметричная (зафиксировано как design decision):
//! - МЕЖДУ полями: независимость. Сбой на одном поле не мешает попытке
//!   записать следующие.
//! - ВНУТРИ поля: первый же сбой auth/IO бросает остаток группы — писать
//!   хвост при дыре в середине значит молча собрать мусор на карте.
//!
//! Трейлеры в группе пропускаются всегда, при любой длине данных: запись в
//! трейлер уничтожает ключи сектора. Позиционный чанк при этом расходуется
//! (payload i соответствует блоку i группы).

use anyhow::Result;
use log::{debug, warn};

use crate::auth::authenticate;
use crate::codec::{encode_binary, encode_text, Encoded};
use crate::layout::{is_trailer, FieldId};
use crate::metrics::{
    record_block_write_error, record_block_written, record_text_truncation, record_trailer_skip,
};
use crate::record::CardRecord;
use crate::transport::CardTransport;

use super::report::{BlockStatus, FieldReport, TxReport};
use super::{Engine, Outcome};

impl Engine {
    pub(crate) fn write_fields(
        &self,
        transport: &mut dyn CardTransport,
        patch: &CardRecord,
    ) -> Result<Outcome> {
        let mut report = TxReport::new("write");

        for id in FieldId::ALL {
            let encoded = if id.is_binary() {
                match patch.binary(id) {
                    Some(data) => encode_binary(data, id.blocks().len()),
                    None => continue, // поля нет в патче — байты на карте не трогаем
                }
            } else {
                match patch.text(id) {
                    Some(value) => encode_text(value, id.blocks().len()),
                    None => continue,
                }
            };

            let mut fr = FieldReport::new(id);
            if encoded.truncated {
                warn!(
                    "write {:?}: value exceeds capacity of {} bytes, tail truncated",
                    id,
                    id.capacity()
                );
                record_text_truncation();
                fr.truncated = true;
            }

            self.write_field_blocks(transport, id, &encoded, &mut fr);
            report.push(fr);
        }

        debug!("write report: {}", report.to_json());
        Ok(Outcome::SuccessEmpty)
    }

    /// Запись группы блоков одного поля. Возврат — не ошибка: сбой уже
    /// учтён в отчёте, а остаток группы по контракту брошен.
    fn write_field_blocks(
        &self,
        transport: &mut dyn CardTransport,
        id: FieldId,
        encoded: &Encoded,
        fr: &mut FieldReport,
    ) {
        for (i, &block) in id.blocks().iter().enumerate() {
            if i >= encoded.payloads.len() {
                break; // данные кончились — хвост группы не трогаем
            }
            if is_trailer(block) {
                warn!("write {:?}: skipping sector trailer at block {}", id, block);
                record_trailer_skip();
                fr.record(block, BlockStatus::TrailerSkipped);
                continue;
            }
            if !authenticate(transport, block, &self.cfg.key_a) {
                warn!("write {:?}: auth failed for block {}, field abandoned", id, block);
                fr.record(block, BlockStatus::AuthFailed);
                return;
            }
            if let Err(e) = transport.write_block(block, &encoded.payloads[i]) {
                warn!(
                    "write {:?}: failed to write block {}, field abandoned: {:#}",
                    id, block, e
                );
                record_block_write_error();
                fr.record(block, BlockStatus::IoFailed);
                return;
            }
            record_block_written();
            fr.record(block, BlockStatus::Ok);
        }
    }
}
