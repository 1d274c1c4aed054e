//! engine/format — обнуление всех записываемых блоков.
//!
//! Best-effort sweep по writable_universe() по возрастанию: блок, который
//! не открылся или не записался, логируется и пропускается. Ни ретраев,
//! ни отката. Трейлеры в universe не попадают конструктивно.

use anyhow::Result;
use log::{debug, warn};

use crate::auth::authenticate;
use crate::consts::BLOCK_SIZE;
use crate::layout::writable_universe;
use crate::metrics::{record_block_write_error, record_block_written};
use crate::transport::CardTransport;

use super::{Engine, Outcome};

impl Engine {
    pub(crate) fn zero_blocks(&self, transport: &mut dyn CardTransport) -> Result<Outcome> {
        let universe = writable_universe();
        debug!("format: {} blocks to clear", universe.len());

        let zero = [0u8; BLOCK_SIZE];
        let mut cleared = 0usize;
        for &block in universe {
            if !authenticate(transport, block, &self.cfg.key_a) {
                warn!("format: auth failed for block {} - skipping", block);
                continue;
            }
            match transport.write_block(block, &zero) {
                Ok(()) => {
                    record_block_written();
                    cleared += 1;
                }
                Err(e) => {
                    warn!("format: failed to clear block {}: {:#}", block, e);
                    record_block_write_error();
                }
            }
        }

        debug!("format: cleared {}/{} blocks", cleared, universe.len());
        Ok(Outcome::SuccessEmpty)
    }
}
