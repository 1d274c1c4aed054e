#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod layout;
pub mod config;
pub mod metrics;

// Протокольный слой карты
pub mod transport; // контракт железного канала (§ hardware transport)
pub mod image;     // файловая эмуляция карты (тесты/CLI/стенды)
pub mod auth;      // Key-A аутентификация секторов
pub mod codec;     // текст/бинарь <-> 16-байтовые блоки, magic-проба

// Движок и API
pub mod engine;  // src/engine/{mod,core,read,write,format,report}.rs
pub mod record;  // CardRecord (sparse patch)
pub mod session; // pending-операции и фоновый dispatch

// Утилиты (hex-ключи, dump)
pub mod util;

// Удобные реэкспорты
pub use config::VaultConfig;
pub use engine::{Engine, Outcome};
pub use image::CardImage;
pub use layout::{is_trailer, writable_universe, FieldId};
pub use record::CardRecord;
pub use session::{Pending, Session, SessionState};
pub use transport::CardTransport;
