//! engine/read — чтение девяти полей в CardRecord.
//!
//! Поля независимы и читаются в фиксированном порядке FieldId::ALL.
//! Отказ auth или чтения отдельного блока деградирует только этот блок
//! (его байты выпадают из конкатенации), поле дочитывается дальше.
//! Бинарные слоты сначала проходят magic-пробу: пустой слот не читается
//! целиком — 25 блоков впустую.

use anyhow::Result;
use log::{debug, warn};

use crate::auth::authenticate;
use crate::codec::{decode_binary, decode_text, probe_presence};
use crate::consts::BLOCK_SIZE;
use crate::layout::FieldId;
use crate::metrics::{record_block_read, record_block_read_error};
use crate::record::CardRecord;
use crate::transport::CardTransport;

use super::report::{BlockStatus, FieldReport, TxReport};
use super::{Engine, Outcome};

impl Engine {
    pub(crate) fn read_fields(&self, transport: &mut dyn CardTransport) -> Result<Outcome> {
        let mut report = TxReport::new("read");
        let mut record = CardRecord::default();

        for id in FieldId::ALL {
            let mut fr = FieldReport::new(id);

            if id.is_binary() {
                let first = id.blocks()[0];
                if probe_presence(transport, first, &self.cfg.key_a, &self.cfg.magic) {
                    let payloads = self.read_field_blocks(transport, id, &mut fr);
                    record.set_binary(id, Some(decode_binary(&payloads)));
                } else {
                    debug!("read {:?}: slot empty (no magic header)", id);
                    fr.probe_missed = true;
                    record.set_binary(id, None);
                }
            } else {
                let payloads = self.read_field_blocks(transport, id, &mut fr);
                let text = decode_text(&payloads);
                // Пустой после чистки текст — поле не заполнено.
                record.set_text(id, if text.is_empty() { None } else { Some(text) });
            }

            report.push(fr);
        }

        debug!("read report: {}", report.to_json());
        Ok(Outcome::Success(record))
    }

    /// Best-effort чтение группы блоков поля: что не открылось или не
    /// прочиталось — выпадает, остальное идёт в конкатенацию по порядку.
    fn read_field_blocks(
        &self,
        transport: &mut dyn CardTransport,
        id: FieldId,
        fr: &mut FieldReport,
    ) -> Vec<[u8; BLOCK_SIZE]> {
        let mut payloads = Vec::with_capacity(id.blocks().len());
        for &block in id.blocks() {
            if !authenticate(transport, block, &self.cfg.key_a) {
                warn!("read {:?}: auth failed for block {}", id, block);
                fr.record(block, BlockStatus::AuthFailed);
                continue;
            }
            match transport.read_block(block) {
                Ok(payload) => {
                    record_block_read();
                    fr.record(block, BlockStatus::Ok);
                    payloads.push(payload);
                }
                Err(e) => {
                    warn!("read {:?}: failed to read block {}: {:#}", id, block, e);
                    record_block_read_error();
                    fr.record(block, BlockStatus::IoFailed);
                }
            }
        }
        payloads
    }
}
