//! Кодирование [`Value`] в BTOON.
//!
//! Каждое значение пишется самым коротким тегом MessagePack. Массивы map
//! с одинаковой схемой (см. [`super::tabular`]) при включённом
//! `auto_tabular` пишутся расширением типа -1:
//!
//! ```text
//! ext-заголовок | 0xff | u32 columns | (u32 len, name)* | u32 rows | cell*
//! ```
//!
//! Все многобайтовые поля — big-endian.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};
use tracing::debug;

use btoon_error::EncodeError;

use super::{
    compression::compress_block,
    options::EncodeOptions,
    tabular::{detect_table, Table},
    tags::{ext_tag, int_tag, tag_for, uint_tag, WireTag, EXT_TYPE_TABLE},
};
use crate::Value;

/// Кодировщик с зафиксированными параметрами.
///
/// Состояния между вызовами нет, поэтому один экземпляр можно использовать
/// из нескольких потоков.
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    options: EncodeOptions,
}

impl Encoder {
    pub fn new(options: EncodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    /// Кодирует значение в новый буфер и, если задано, сжимает его.
    pub fn encode(
        &self,
        value: &Value,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut buf = Vec::new();
        self.write_value(&mut buf, value)?;

        if !self.options.compress {
            return Ok(buf);
        }
        let compressed = compress_block(&buf, self.options.compression_level)?;
        debug!(
            raw = buf.len(),
            compressed = compressed.len(),
            level = self.options.compression_level,
            "compressed encoded buffer"
        );
        Ok(compressed)
    }

    /// Пишет значение в поток без сжатия.
    pub fn write_value<W: Write>(
        &self,
        w: &mut W,
        value: &Value,
    ) -> Result<(), EncodeError> {
        self.write_nested(w, value, 0)
    }

    fn write_nested<W: Write>(
        &self,
        w: &mut W,
        value: &Value,
        depth: usize,
    ) -> Result<(), EncodeError> {
        match value {
            Value::Array(items) => {
                let depth = self.enter(depth)?;
                if self.options.auto_tabular {
                    if let Some(table) = detect_table(items) {
                        return write_table(w, &table);
                    }
                }
                write_header(w, tag_for(value)?, items.len())?;
                for item in items {
                    self.write_nested(w, item, depth)?;
                }
                Ok(())
            }
            Value::Map(entries) => {
                let depth = self.enter(depth)?;
                write_header(w, tag_for(value)?, entries.len())?;
                for (k, v) in entries {
                    self.write_nested(w, k, depth)?;
                    self.write_nested(w, v, depth)?;
                }
                Ok(())
            }
            _ => write_primitive(w, value),
        }
    }

    fn enter(
        &self,
        depth: usize,
    ) -> Result<usize, EncodeError> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(EncodeError::DepthLimit {
                current: depth,
                max: self.options.max_depth,
            });
        }
        Ok(depth)
    }
}

/// Кодирует значение с заданными параметрами.
pub fn encode(
    value: &Value,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    Encoder::new(*options).encode(value)
}

/// Пишет скаляр: всё, кроме массивов и map.
fn write_primitive<W: Write>(
    w: &mut W,
    value: &Value,
) -> Result<(), EncodeError> {
    match value {
        Value::Null | Value::Bool(_) => w.write_u8(tag_for(value)?.to_byte())?,
        Value::Int(n) if *n >= 0 => write_uint(w, *n as u64)?,
        Value::Int(n) => write_negative(w, *n)?,
        Value::UInt(n) => write_uint(w, *n)?,
        Value::Float(x) => {
            w.write_u8(WireTag::Float64.to_byte())?;
            w.write_f64::<BigEndian>(*x)?;
        }
        Value::Str(s) => {
            write_header(w, tag_for(value)?, s.len())?;
            w.write_all(s.as_bytes())?;
        }
        Value::Binary(b) => {
            write_header(w, tag_for(value)?, b.len())?;
            w.write_all(b)?;
        }
        Value::Array(_) | Value::Map(_) => {
            return Err(EncodeError::unsupported(
                value.kind(),
                "container where a primitive is required",
            ))
        }
    }
    Ok(())
}

fn write_uint<W: Write>(
    w: &mut W,
    n: u64,
) -> std::io::Result<()> {
    let tag = uint_tag(n);
    w.write_u8(tag.to_byte())?;
    match tag {
        WireTag::UInt8 => w.write_u8(n as u8),
        WireTag::UInt16 => w.write_u16::<BigEndian>(n as u16),
        WireTag::UInt32 => w.write_u32::<BigEndian>(n as u32),
        WireTag::UInt64 => w.write_u64::<BigEndian>(n),
        _ => Ok(()),
    }
}

fn write_negative<W: Write>(
    w: &mut W,
    n: i64,
) -> std::io::Result<()> {
    let tag = int_tag(n);
    w.write_u8(tag.to_byte())?;
    match tag {
        WireTag::Int8 => w.write_i8(n as i8),
        WireTag::Int16 => w.write_i16::<BigEndian>(n as i16),
        WireTag::Int32 => w.write_i32::<BigEndian>(n as i32),
        WireTag::Int64 => w.write_i64::<BigEndian>(n),
        _ => Ok(()),
    }
}

/// Байт тега и, если тег не fix-формы, поле длины нужной ширины.
fn write_header<W: Write>(
    w: &mut W,
    tag: WireTag,
    len: usize,
) -> std::io::Result<()> {
    w.write_u8(tag.to_byte())?;
    match tag.length_width() {
        1 => w.write_u8(len as u8),
        2 => w.write_u16::<BigEndian>(len as u16),
        4 => w.write_u32::<BigEndian>(len as u32),
        _ => Ok(()),
    }
}

fn write_table<W: Write>(
    w: &mut W,
    table: &Table<'_>,
) -> Result<(), EncodeError> {
    // Длина полезной нагрузки нужна заголовку, поэтому собираем её заранее.
    let mut payload = Vec::new();
    payload.write_u32::<BigEndian>(table_len("column count", table.column_count())?)?;
    for name in table.columns() {
        payload.write_u32::<BigEndian>(table_len("column name", name.len())?)?;
        payload.write_all(name.as_bytes())?;
    }
    payload.write_u32::<BigEndian>(table_len("row count", table.row_count())?)?;
    for cell in table.cells() {
        write_primitive(&mut payload, cell)?;
    }

    let tag = ext_tag(payload.len())?;
    write_header(w, tag, payload.len())?;
    w.write_i8(EXT_TYPE_TABLE)?;
    w.write_all(&payload)?;

    debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        payload = payload.len(),
        "encoded array as table"
    );
    Ok(())
}

fn table_len(
    what: &str,
    len: usize,
) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| {
        EncodeError::unsupported(what, format!("{len} does not fit the 32-bit table field"))
    })
}
