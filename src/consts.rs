//! Общие константы физической раскладки карты (blocks, sectors, key, magic).
//!
//! Значения bit-exact: они обязаны совпадать с уже развёрнутыми картами.
//! Менять их — значит потерять совместимость со всем выпущенным тиражом.

// -------- Card geometry (Mifare Classic 1K) --------
pub const BLOCK_SIZE: usize = 16;
pub const SECTOR_BLOCKS: u8 = 4;
pub const CARD_BLOCKS: u8 = 64;

// | Sector   | Data blocks | Trailer (keys + access bits) |
// | :------- | :---------- | :--------------------------- |
// | 0        | 0, 1, 2     | 3                            |
// | 1        | 4, 5, 6     | 7                            |
// | 2        | 8, 9, 10    | 11                           |
// | ...      | ...         | ...                          |
// | 15       | 60, 61, 62  | 63                           |
//
// Трейлеры (3, 7, 11, ...) никогда не адресуются полями: там живут ключи.

// -------- Authentication --------
// Key-A для всех секторов (единый транспортный ключ, без диверсификации).
pub const KEY_A_DEFAULT: [u8; 6] = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];

// Gate-блок: одна auth-проба по нему отсекает чужие раскладки до любого
// доступа к полям. Развёрнутое значение — 10 (sector 2).
pub const GATE_BLOCK: u8 = 10;

// -------- Binary slot presence marker --------
// Первые 3 байта головного блока заполненного слота: "FMR".
pub const MAGIC_HEADER: [u8; 3] = [0x46, 0x4D, 0x52];

// -------- Field -> block tables --------
// Семь текстовых полей (группы по 2-3 блока) + два бинарных слота.
pub const BLOCKS_FIELD_ONE: &[u8] = &[1, 60, 26];
pub const BLOCKS_FIELD_TWO: &[u8] = &[10, 2, 6];
pub const BLOCKS_FIELD_THREE: &[u8] = &[28, 25, 61];
pub const BLOCKS_FIELD_FOUR: &[u8] = &[4, 9, 30];
pub const BLOCKS_FIELD_FIVE: &[u8] = &[34, 45, 56];
pub const BLOCKS_FIELD_SIX: &[u8] = &[22, 57, 54];
pub const BLOCKS_FIELD_SEVEN: &[u8] = &[8, 62];

// Шаблонные (бинарные) слоты: 25 блоков и 4 блока.
pub const BLOCKS_TEMPLATE_ONE: &[u8] = &[
    12, 13, 18, 40, 16, 17, 21, 5, 20, 46, 42, 48, 29, 41, 37, 14, 38, 50, 44, 33, 49, 52, 53, 58,
    24,
];
pub const BLOCKS_TEMPLATE_TWO: &[u8] = &[20, 22, 60, 44];

// -------- Card image file (emulation transport) --------
// Формат <image> (LE):
// [magic8="TV1CARD\0"][ver u32=1][blocks u32][crc u64 (низ 32 бита)]
// затем blocks * 16 байт сырых данных. CRC32 считается по [ver][blocks]+data.
pub const IMG_MAGIC: &[u8; 8] = b"TV1CARD\0";
pub const IMG_VERSION: u32 = 1;
pub const IMG_HDR_SIZE: usize = 24;

// Заводской трейлер: Key-A FF..FF, transport access bits FF 07 80 69, Key-B FF..FF.
pub const TRAILER_DEFAULT: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x07, 0x80, 0x69, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF,
];
