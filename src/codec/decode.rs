//! Разбор BTOON-буфера обратно в [`Value`].
//!
//! Декодер принимает любой корректный MessagePack (включая float32 и все
//! формы ext/fixext), а не только минимальные формы, которые пишет
//! кодировщик. Из расширений понимается только таблица (тип -1): она
//! разворачивается обратно в массив map.
//!
//! Перед выделением памяти под массив, map или таблицу объявленное число
//! элементов сверяется с остатком буфера, поэтому короткий вход не может
//! заставить декодер выделить гигабайты.

use byteorder::{BigEndian, ByteOrder};
use tracing::debug;

use btoon_error::DecodeError;

use super::{
    compression::decompress_block,
    options::DecodeOptions,
    tags::{value_kind_for, WireTag, EXT_TYPE_TABLE},
};
use crate::Value;

/// Декодер с зафиксированными параметрами.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecodeOptions,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Разбирает буфер, содержащий ровно одно значение.
    ///
    /// При `decompress` буфер сначала распаковывается; смещения в ошибках
    /// тогда относятся к распакованным данным.
    pub fn decode(
        &self,
        bytes: &[u8],
    ) -> Result<Value, DecodeError> {
        let result = if self.options.decompress {
            decompress_block(bytes, self.options.max_decompressed_size)
                .and_then(|raw| self.decode_exact(&raw))
        } else {
            self.decode_exact(bytes)
        };

        if let Err(e) = &result {
            debug!(
                error = %e,
                offset = e.offset(),
                input = bytes.len(),
                "decode failed"
            );
        }
        result
    }

    /// Разбирает первое значение буфера и возвращает его вместе с числом
    /// прочитанных байт. Остаток буфера не проверяется.
    ///
    /// Буфер всегда читается как несжатый, флаг `decompress` здесь не
    /// действует: у zlib-потока нет границы, после которой могло бы начаться
    /// следующее значение. Сжатый буфер следует сначала распаковать через
    /// [`decompress_block`](super::compression::decompress_block).
    pub fn decode_prefix(
        &self,
        bytes: &[u8],
    ) -> Result<(Value, usize), DecodeError> {
        let mut r = Reader::new(bytes, 0);
        let value = self.read_value(&mut r, 0)?;
        Ok((value, r.pos))
    }

    fn decode_exact(
        &self,
        bytes: &[u8],
    ) -> Result<Value, DecodeError> {
        let (value, consumed) = self.decode_prefix(bytes)?;
        if consumed < bytes.len() {
            return Err(DecodeError::TrailingBytes {
                offset: consumed,
                remaining: bytes.len() - consumed,
            });
        }
        Ok(value)
    }

    fn read_value(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let offset = r.offset();
        let tag = value_kind_for(r.read_u8("tag")?, offset)?;

        let value = match tag {
            WireTag::PositiveFixInt(n) => Value::Int(n as i64),
            WireTag::NegativeFixInt(n) => Value::Int(n as i64),
            WireTag::Nil => Value::Null,
            WireTag::False => Value::Bool(false),
            WireTag::True => Value::Bool(true),

            WireTag::UInt8 => unsigned(r.read_u8("uint8")? as u64),
            WireTag::UInt16 => unsigned(BigEndian::read_u16(r.take(2, "uint16")?) as u64),
            WireTag::UInt32 => unsigned(BigEndian::read_u32(r.take(4, "uint32")?) as u64),
            WireTag::UInt64 => unsigned(BigEndian::read_u64(r.take(8, "uint64")?)),
            WireTag::Int8 => Value::Int(r.read_u8("int8")? as i8 as i64),
            WireTag::Int16 => Value::Int(BigEndian::read_i16(r.take(2, "int16")?) as i64),
            WireTag::Int32 => Value::Int(BigEndian::read_i32(r.take(4, "int32")?) as i64),
            WireTag::Int64 => Value::Int(BigEndian::read_i64(r.take(8, "int64")?)),
            WireTag::Float32 => Value::Float(BigEndian::read_f32(r.take(4, "float32")?) as f64),
            WireTag::Float64 => Value::Float(BigEndian::read_f64(r.take(8, "float64")?)),

            WireTag::FixStr(n) => self.read_str(r, n as u64)?,
            WireTag::Str8 | WireTag::Str16 | WireTag::Str32 => {
                let len = r.read_len(tag)?;
                self.read_str(r, len)?
            }
            WireTag::Bin8 | WireTag::Bin16 | WireTag::Bin32 => {
                let len = r.read_len(tag)?;
                Value::Binary(r.take_declared(len, "binary")?.to_vec())
            }

            WireTag::FixArray(n) => self.read_array(r, n as u64, depth)?,
            WireTag::Array16 | WireTag::Array32 => {
                let len = r.read_len(tag)?;
                self.read_array(r, len, depth)?
            }
            WireTag::FixMap(n) => self.read_map(r, n as u64, depth)?,
            WireTag::Map16 | WireTag::Map32 => {
                let len = r.read_len(tag)?;
                self.read_map(r, len, depth)?
            }

            WireTag::FixExt1
            | WireTag::FixExt2
            | WireTag::FixExt4
            | WireTag::FixExt8
            | WireTag::FixExt16 => {
                let len = tag.fixext_len().unwrap_or_default() as u64;
                self.read_ext(r, len, depth)?
            }
            WireTag::Ext8 | WireTag::Ext16 | WireTag::Ext32 => {
                let len = r.read_len(tag)?;
                self.read_ext(r, len, depth)?
            }
        };
        Ok(value)
    }

    fn read_str(
        &self,
        r: &mut Reader<'_>,
        len: u64,
    ) -> Result<Value, DecodeError> {
        let offset = r.offset();
        let bytes = r.take_declared(len, "string")?;
        if self.options.strict_utf8 {
            utf8(bytes, offset).map(Value::from)
        } else {
            Ok(Value::Str(String::from_utf8_lossy(bytes).into_owned()))
        }
    }

    fn read_array(
        &self,
        r: &mut Reader<'_>,
        len: u64,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let depth = self.enter(depth)?;
        // Каждый элемент занимает хотя бы один байт.
        let len = r.check_count(len, 1, "array")?;
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(self.read_value(r, depth)?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(
        &self,
        r: &mut Reader<'_>,
        len: u64,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let depth = self.enter(depth)?;
        let len = r.check_count(len, 2, "map")?;
        let mut entries = Vec::with_capacity(len);
        for _ in 0..len {
            let k = self.read_value(r, depth)?;
            let v = self.read_value(r, depth)?;
            entries.push((k, v));
        }
        Ok(Value::Map(entries))
    }

    fn read_ext(
        &self,
        r: &mut Reader<'_>,
        len: u64,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let type_offset = r.offset();
        let ext_type = r.read_u8("extension type")? as i8;
        if ext_type != EXT_TYPE_TABLE {
            return Err(DecodeError::UnknownExtType {
                ext_type,
                offset: type_offset,
            });
        }
        let depth = self.enter(depth)?;
        let base = r.offset();
        let payload = r.take_declared(len, "table")?;

        let mut sub = Reader::new(payload, base);
        match self.read_table(&mut sub, depth) {
            Err(e) if e.is_truncation() => Err(DecodeError::MalformedTable {
                reason: format!("payload of {len} bytes ends early: {e}"),
                offset: base,
            }),
            other => other,
        }
    }

    /// Разворачивает полезную нагрузку таблицы в массив map. Читатель `r`
    /// ограничен ровно полезной нагрузкой.
    fn read_table(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let column_count = r.read_u32("table column count")? as u64;
        // Каждое имя — минимум 4 байта длины.
        let column_count = r.check_count(column_count, 4, "table columns")?;

        let mut columns: Vec<String> = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let offset = r.offset();
            let len = r.read_u32("column name length")? as u64;
            let name_offset = r.offset();
            let name = utf8(r.take_declared(len, "column name")?, name_offset)?;
            if columns.iter().any(|c| *c == name) {
                return Err(DecodeError::MalformedTable {
                    reason: format!("duplicate column {name:?}"),
                    offset,
                });
            }
            columns.push(name);
        }

        let row_count = r.read_u32("table row count")? as u64;
        let cell_count = row_count.saturating_mul(columns.len() as u64);
        r.check_count(cell_count, 1, "table cells")?;

        // Каждая строка получает свою копию имён колонок. Таблица без колонок
        // разворачивается в `row_count` пустых map и ограничена тем же пределом.
        let expansion = row_count.saturating_mul(row_footprint(&columns));
        if expansion > self.options.max_table_expansion {
            return Err(DecodeError::SizeLimit {
                what: "table expansion",
                size: expansion,
                limit: self.options.max_table_expansion,
            });
        }

        let mut rows = Vec::with_capacity(row_count as usize);
        for _ in 0..row_count {
            let mut entries = Vec::with_capacity(columns.len());
            for column in &columns {
                let cell = self.read_cell(r, depth)?;
                entries.push((Value::Str(column.clone()), cell));
            }
            rows.push(Value::Map(entries));
        }

        if r.remaining() > 0 {
            return Err(DecodeError::MalformedTable {
                reason: format!("{} bytes after the last row", r.remaining()),
                offset: r.offset(),
            });
        }
        Ok(Value::Array(rows))
    }

    fn read_cell(
        &self,
        r: &mut Reader<'_>,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        let offset = r.offset();
        if let Some(tag) = r.peek().and_then(WireTag::from_byte) {
            let nested = matches!(
                tag,
                WireTag::FixArray(_)
                    | WireTag::Array16
                    | WireTag::Array32
                    | WireTag::FixMap(_)
                    | WireTag::Map16
                    | WireTag::Map32
            ) || tag.fixext_len().is_some()
                || matches!(tag, WireTag::Ext8 | WireTag::Ext16 | WireTag::Ext32);
            if nested {
                return Err(DecodeError::MalformedTable {
                    reason: "cell is not a primitive".to_string(),
                    offset,
                });
            }
        }
        self.read_value(r, depth)
    }

    fn enter(
        &self,
        depth: usize,
    ) -> Result<usize, DecodeError> {
        let depth = depth + 1;
        if depth > self.options.max_depth {
            return Err(DecodeError::DepthLimit {
                current: depth,
                max: self.options.max_depth,
            });
        }
        Ok(depth)
    }
}

/// Разбирает буфер с заданными параметрами.
pub fn decode(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Value, DecodeError> {
    Decoder::new(*options).decode(bytes)
}

/// Оценка памяти под одну развёрнутую строку таблицы.
fn row_footprint(columns: &[String]) -> u64 {
    let entries: usize = columns
        .iter()
        .map(|name| name.len() + std::mem::size_of::<(Value, Value)>())
        .sum();
    (std::mem::size_of::<Value>() + entries) as u64
}

/// Беззнаковое значение становится `Int`, если помещается в `i64`.
fn unsigned(n: u64) -> Value {
    match i64::try_from(n) {
        Ok(i) => Value::Int(i),
        Err(_) => Value::UInt(n),
    }
}

fn utf8(
    bytes: &[u8],
    offset: usize,
) -> Result<String, DecodeError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| DecodeError::InvalidUtf8 {
            offset: offset + e.valid_up_to(),
            reason: e.to_string(),
        })
}

/// Курсор по срезу. `base` — абсолютное смещение начала среза во входном
/// буфере, чтобы ошибки внутри таблицы указывали на реальную позицию.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(
        buf: &'a [u8],
        base: usize,
    ) -> Self {
        Self { buf, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Поле фиксированной ширины.
    fn take(
        &mut self,
        n: usize,
        context: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedInput {
                context,
                offset: self.offset(),
                needed: n,
                available: self.remaining(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Полезная нагрузка объявленной длины.
    fn take_declared(
        &mut self,
        len: u64,
        what: &'static str,
    ) -> Result<&'a [u8], DecodeError> {
        let n = self.check_count(len, 1, what)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Проверяет, что `count` элементов по `min_size` байт помещаются в
    /// остаток буфера.
    fn check_count(
        &self,
        count: u64,
        min_size: u64,
        what: &'static str,
    ) -> Result<usize, DecodeError> {
        let needed = count.saturating_mul(min_size);
        if needed > self.remaining() as u64 {
            return Err(DecodeError::LengthOverrun {
                what,
                declared: count,
                available: self.remaining(),
                offset: self.offset(),
            });
        }
        Ok(count as usize)
    }

    fn read_u8(
        &mut self,
        context: &'static str,
    ) -> Result<u8, DecodeError> {
        Ok(self.take(1, context)?[0])
    }

    fn read_u32(
        &mut self,
        context: &'static str,
    ) -> Result<u32, DecodeError> {
        Ok(BigEndian::read_u32(self.take(4, context)?))
    }

    /// Поле длины, ширина которого задана тегом.
    fn read_len(
        &mut self,
        tag: WireTag,
    ) -> Result<u64, DecodeError> {
        let context = length_context(tag);
        let len = match tag.length_width() {
            1 => self.read_u8(context)? as u64,
            2 => BigEndian::read_u16(self.take(2, context)?) as u64,
            _ => self.read_u32(context)? as u64,
        };
        Ok(len)
    }
}

fn length_context(tag: WireTag) -> &'static str {
    match tag {
        WireTag::Str8 => "str8 length",
        WireTag::Str16 => "str16 length",
        WireTag::Str32 => "str32 length",
        WireTag::Bin8 => "bin8 length",
        WireTag::Bin16 => "bin16 length",
        WireTag::Bin32 => "bin32 length",
        WireTag::Array16 => "array16 length",
        WireTag::Array32 => "array32 length",
        WireTag::Map16 => "map16 length",
        WireTag::Map32 => "map32 length",
        WireTag::Ext8 => "ext8 length",
        WireTag::Ext16 => "ext16 length",
        _ => "ext32 length",
    }
}
