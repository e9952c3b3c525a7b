//! Кодек BTOON: бинарное представление [`crate::Value`], совместимое с
//! MessagePack.
//!
//! ## Пример
//!
//! ```
//! use btoon::{decode, encode, DecodeOptions, EncodeOptions, Value};
//!
//! let rows = Value::array([
//!     Value::map([("id", Value::from(1)), ("name", Value::from("A"))]),
//!     Value::map([("id", Value::from(2)), ("name", Value::from("B"))]),
//! ]);
//! let bytes = encode(&rows, &EncodeOptions::default())?;
//! assert_eq!(decode(&bytes, &DecodeOptions::default())?, rows);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Модули
//!
//! - [`tags`] — таблица тегов и выбор минимального тега
//! - [`tabular`] — распознавание табличных массивов
//! - [`encode`] — кодирование значений
//! - [`decode`] — разбор буфера
//! - [`compression`] — сжатие zlib
//! - [`options`] — параметры кодирования и декодирования

pub mod compression;
pub mod decode;
pub mod encode;
pub mod options;
pub mod tabular;
pub mod tags;

pub use compression::{compress, compress_block, decompress, decompress_block};
pub use decode::{decode, Decoder};
pub use encode::{encode, Encoder};
pub use options::{DecodeOptions, EncodeOptions, DEFAULT_MAX_DEPTH};
pub use tabular::{analyze, detect_table, Rejection, Table};
pub use tags::WireTag;
