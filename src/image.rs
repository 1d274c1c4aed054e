//! image — файловая эмуляция карты (CardTransport поверх образа).
//!
//! Назначение: тесты, CLI и стенды без железного ридера. Образ — сырые
//! blocks * 16 байт с заголовком (magic + version + CRC32, см. consts.rs).
//!
//! Поведение повторяет карту, а не удобную абстракцию:
//! - Key-A сверяется с байтами, реально лежащими в трейлере сектора
//!   (перезапись трейлера уничтожает ключ — сектор перестаёт открываться).
//! - auth-сессия одна и на один сектор; connect()/close() её сбрасывают.
//! - Запись write-through: каждый write_block сразу уходит в файл, как на
//!   физической карте.
//! - Эксклюзивный advisory-lock (fs2) на файл образа: одна транзакция на
//!   карту, вторую открыть нельзя, пока образ не закрыт.

use anyhow::{anyhow, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::consts::{
    BLOCK_SIZE, CARD_BLOCKS, IMG_HDR_SIZE, IMG_MAGIC, IMG_VERSION, SECTOR_BLOCKS, TRAILER_DEFAULT,
};
use crate::transport::CardTransport;

/// Файловый образ карты Mifare Classic 1K (64 блока, 16 секторов по 4).
pub struct CardImage {
    path: PathBuf,
    file: std::fs::File, // держит эксклюзивный lock до Drop
    data: Vec<u8>,
    blocks: u8,
    connected: bool,
    auth_sector: Option<u8>,
}

fn compute_img_crc(version: u32, blocks: u32, data: &[u8]) -> u32 {
    let mut h = Crc32::new();
    let mut buf4 = [0u8; 4];
    buf4.copy_from_slice(&version.to_le_bytes());
    h.update(&buf4);
    buf4.copy_from_slice(&blocks.to_le_bytes());
    h.update(&buf4);
    h.update(data);
    h.finalize()
}

impl CardImage {
    /// Создать чистый образ: нули в data-блоках, заводские трейлеры
    /// (Key-A FF..FF + transport access bits). Ошибка, если файл существует.
    pub fn create(path: &Path) -> Result<Self> {
        let mut data = vec![0u8; CARD_BLOCKS as usize * BLOCK_SIZE];
        for sector in 0..(CARD_BLOCKS / SECTOR_BLOCKS) {
            let trailer = (sector * SECTOR_BLOCKS + SECTOR_BLOCKS - 1) as usize;
            data[trailer * BLOCK_SIZE..(trailer + 1) * BLOCK_SIZE]
                .copy_from_slice(&TRAILER_DEFAULT);
        }

        let mut f = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("create card image {}", path.display()))?;

        let mut header = Vec::with_capacity(IMG_HDR_SIZE);
        header.extend_from_slice(IMG_MAGIC);
        header.write_u32::<LittleEndian>(IMG_VERSION)?;
        header.write_u32::<LittleEndian>(CARD_BLOCKS as u32)?;
        let crc = compute_img_crc(IMG_VERSION, CARD_BLOCKS as u32, &data);
        header.write_u64::<LittleEndian>(crc as u64)?;
        f.write_all(&header)?;
        f.write_all(&data)?;
        f.sync_all()?;

        f.try_lock_exclusive()
            .with_context(|| format!("lock card image {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: f,
            data,
            blocks: CARD_BLOCKS,
            connected: false,
            auth_sector: None,
        })
    }

    /// Открыть существующий образ с проверкой заголовка и CRC.
    pub fn open(path: &Path) -> Result<Self> {
        let mut f = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("open card image {}", path.display()))?;

        // Одна транзакция на карту: второй открыватель получает ошибку сразу.
        f.try_lock_exclusive()
            .with_context(|| format!("card image is busy: {}", path.display()))?;

        let mut magic = [0u8; 8];
        f.read_exact(&mut magic)?;
        if &magic != IMG_MAGIC {
            return Err(anyhow!("bad image magic in {}", path.display()));
        }
        let version = f.read_u32::<LittleEndian>()?;
        if version != IMG_VERSION {
            return Err(anyhow!(
                "unsupported image version {} in {}",
                version,
                path.display()
            ));
        }
        let blocks = f.read_u32::<LittleEndian>()?;
        if blocks == 0 || blocks > u8::MAX as u32 || blocks % SECTOR_BLOCKS as u32 != 0 {
            return Err(anyhow!("bad block count {} in {}", blocks, path.display()));
        }
        let stored_crc = f.read_u64::<LittleEndian>()? as u32;

        let mut data = vec![0u8; blocks as usize * BLOCK_SIZE];
        f.read_exact(&mut data)
            .with_context(|| format!("read image body {}", path.display()))?;

        let actual = compute_img_crc(version, blocks, &data);
        if actual != stored_crc {
            return Err(anyhow!(
                "image CRC mismatch in {} (stored {:08x}, actual {:08x})",
                path.display(),
                stored_crc,
                actual
            ));
        }

        Ok(Self {
            path: path.to_path_buf(),
            file: f,
            data,
            blocks: blocks as u8,
            connected: false,
            auth_sector: None,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn block_count(&self) -> u8 {
        self.blocks
    }

    /// Сырой доступ к байтам блока мимо auth — только для dump/диагностики,
    /// на железной карте такого пути нет.
    pub fn raw_block(&self, block: u8) -> Result<&[u8]> {
        self.check_range(block)?;
        let off = block as usize * BLOCK_SIZE;
        Ok(&self.data[off..off + BLOCK_SIZE])
    }

    fn check_range(&self, block: u8) -> Result<()> {
        if block >= self.blocks {
            return Err(anyhow!("block {} out of range (card has {})", block, self.blocks));
        }
        Ok(())
    }

    fn trailer_key_a(&self, sector: u8) -> &[u8] {
        let trailer = (sector * SECTOR_BLOCKS + SECTOR_BLOCKS - 1) as usize;
        &self.data[trailer * BLOCK_SIZE..trailer * BLOCK_SIZE + 6]
    }

    /// Дописать блок и CRC в файл (write-through).
    fn persist_block(&mut self, block: u8) -> Result<()> {
        let off = block as usize * BLOCK_SIZE;
        self.file
            .seek(SeekFrom::Start((IMG_HDR_SIZE + off) as u64))?;
        self.file.write_all(&self.data[off..off + BLOCK_SIZE])?;

        let crc = compute_img_crc(IMG_VERSION, self.blocks as u32, &self.data);
        self.file.seek(SeekFrom::Start(16))?; // magic8 + ver4 + blocks4
        self.file.write_u64::<LittleEndian>(crc as u64)?;
        Ok(())
    }
}

impl CardTransport for CardImage {
    fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(anyhow!("card already connected"));
        }
        self.connected = true;
        self.auth_sector = None;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.auth_sector = None;
        // Ошибку fsync наружу не прячем: close и так зовётся best-effort.
        self.file.sync_all().context("sync card image")?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn block_to_sector(&self, block: u8) -> u8 {
        block / SECTOR_BLOCKS
    }

    fn authenticate_sector_with_key_a(&mut self, sector: u8, key: &[u8; 6]) -> Result<bool> {
        if !self.connected {
            return Err(anyhow!("authenticate: card not connected"));
        }
        if sector >= self.blocks / SECTOR_BLOCKS {
            return Err(anyhow!("sector {} out of range", sector));
        }
        if self.trailer_key_a(sector) == key {
            self.auth_sector = Some(sector);
            Ok(true)
        } else {
            self.auth_sector = None;
            Ok(false)
        }
    }

    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE]> {
        if !self.connected {
            return Err(anyhow!("read: card not connected"));
        }
        self.check_range(block)?;
        if self.auth_sector != Some(self.block_to_sector(block)) {
            return Err(anyhow!("read block {}: sector not authenticated", block));
        }
        let off = block as usize * BLOCK_SIZE;
        let mut out = [0u8; BLOCK_SIZE];
        out.copy_from_slice(&self.data[off..off + BLOCK_SIZE]);
        Ok(out)
    }

    fn write_block(&mut self, block: u8, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        if !self.connected {
            return Err(anyhow!("write: card not connected"));
        }
        self.check_range(block)?;
        if self.auth_sector != Some(self.block_to_sector(block)) {
            return Err(anyhow!("write block {}: sector not authenticated", block));
        }
        let off = block as usize * BLOCK_SIZE;
        self.data[off..off + BLOCK_SIZE].copy_from_slice(data);
        self.persist_block(block)
            .with_context(|| format!("persist block {}", block))
    }
}

impl Drop for CardImage {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}
