//! Таблица тегов MessagePack, используемая кодеком BTOON.
//!
//! Тег — первый байт значения: он определяет тип и, для значений переменной
//! длины, ширину поля длины. Выбор тега при кодировании всегда минимален:
//! берётся самый узкий тег, вместимость которого покрывает длину или
//! величину значения.

use btoon_error::{DecodeError, EncodeError};

use crate::Value;

/// Положительный fixint: `0x00..=0x7f`.
pub const TAG_POSITIVE_FIXINT_MAX: u8 = 0x7f;
/// Fixmap: `0x80..=0x8f`, длина в младших 4 битах.
pub const TAG_FIXMAP: u8 = 0x80;
/// Fixarray: `0x90..=0x9f`, длина в младших 4 битах.
pub const TAG_FIXARRAY: u8 = 0x90;
/// Fixstr: `0xa0..=0xbf`, длина в младших 5 битах.
pub const TAG_FIXSTR: u8 = 0xa0;
pub const TAG_NIL: u8 = 0xc0;
/// Никогда не используется форматом.
pub const TAG_NEVER_USED: u8 = 0xc1;
pub const TAG_FALSE: u8 = 0xc2;
pub const TAG_TRUE: u8 = 0xc3;
pub const TAG_BIN8: u8 = 0xc4;
pub const TAG_BIN16: u8 = 0xc5;
pub const TAG_BIN32: u8 = 0xc6;
pub const TAG_EXT8: u8 = 0xc7;
pub const TAG_EXT16: u8 = 0xc8;
pub const TAG_EXT32: u8 = 0xc9;
pub const TAG_FLOAT32: u8 = 0xca;
pub const TAG_FLOAT64: u8 = 0xcb;
pub const TAG_UINT8: u8 = 0xcc;
pub const TAG_UINT16: u8 = 0xcd;
pub const TAG_UINT32: u8 = 0xce;
pub const TAG_UINT64: u8 = 0xcf;
pub const TAG_INT8: u8 = 0xd0;
pub const TAG_INT16: u8 = 0xd1;
pub const TAG_INT32: u8 = 0xd2;
pub const TAG_INT64: u8 = 0xd3;
pub const TAG_FIXEXT1: u8 = 0xd4;
pub const TAG_FIXEXT2: u8 = 0xd5;
pub const TAG_FIXEXT4: u8 = 0xd6;
pub const TAG_FIXEXT8: u8 = 0xd7;
pub const TAG_FIXEXT16: u8 = 0xd8;
pub const TAG_STR8: u8 = 0xd9;
pub const TAG_STR16: u8 = 0xda;
pub const TAG_STR32: u8 = 0xdb;
pub const TAG_ARRAY16: u8 = 0xdc;
pub const TAG_ARRAY32: u8 = 0xdd;
pub const TAG_MAP16: u8 = 0xde;
pub const TAG_MAP32: u8 = 0xdf;
/// Отрицательный fixint: `0xe0..=0xff` (от -32 до -1).
pub const TAG_NEGATIVE_FIXINT: u8 = 0xe0;

/// Тип расширения, под которым передаётся таблица.
pub const EXT_TYPE_TABLE: i8 = -1;

/// Тег MessagePack вместе со встроенным в байт значением (для fix-форм).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireTag {
    /// Целое 0..=127, хранится прямо в байте тега.
    PositiveFixInt(u8),
    /// Целое -32..=-1, хранится прямо в байте тега.
    NegativeFixInt(i8),
    /// Map из 0..=15 пар.
    FixMap(u8),
    /// Array из 0..=15 элементов.
    FixArray(u8),
    /// Строка длиной 0..=31 байт.
    FixStr(u8),
    Nil,
    False,
    True,
    Bin8,
    Bin16,
    Bin32,
    Ext8,
    Ext16,
    Ext32,
    Float32,
    Float64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    FixExt1,
    FixExt2,
    FixExt4,
    FixExt8,
    FixExt16,
    Str8,
    Str16,
    Str32,
    Array16,
    Array32,
    Map16,
    Map32,
}

impl WireTag {
    /// Разбирает байт тега. `None` только для `0xc1`.
    pub const fn from_byte(b: u8) -> Option<WireTag> {
        let tag = match b {
            0x00..=0x7f => WireTag::PositiveFixInt(b),
            0x80..=0x8f => WireTag::FixMap(b & 0x0f),
            0x90..=0x9f => WireTag::FixArray(b & 0x0f),
            0xa0..=0xbf => WireTag::FixStr(b & 0x1f),
            TAG_NIL => WireTag::Nil,
            TAG_NEVER_USED => return None,
            TAG_FALSE => WireTag::False,
            TAG_TRUE => WireTag::True,
            TAG_BIN8 => WireTag::Bin8,
            TAG_BIN16 => WireTag::Bin16,
            TAG_BIN32 => WireTag::Bin32,
            TAG_EXT8 => WireTag::Ext8,
            TAG_EXT16 => WireTag::Ext16,
            TAG_EXT32 => WireTag::Ext32,
            TAG_FLOAT32 => WireTag::Float32,
            TAG_FLOAT64 => WireTag::Float64,
            TAG_UINT8 => WireTag::UInt8,
            TAG_UINT16 => WireTag::UInt16,
            TAG_UINT32 => WireTag::UInt32,
            TAG_UINT64 => WireTag::UInt64,
            TAG_INT8 => WireTag::Int8,
            TAG_INT16 => WireTag::Int16,
            TAG_INT32 => WireTag::Int32,
            TAG_INT64 => WireTag::Int64,
            TAG_FIXEXT1 => WireTag::FixExt1,
            TAG_FIXEXT2 => WireTag::FixExt2,
            TAG_FIXEXT4 => WireTag::FixExt4,
            TAG_FIXEXT8 => WireTag::FixExt8,
            TAG_FIXEXT16 => WireTag::FixExt16,
            TAG_STR8 => WireTag::Str8,
            TAG_STR16 => WireTag::Str16,
            TAG_STR32 => WireTag::Str32,
            TAG_ARRAY16 => WireTag::Array16,
            TAG_ARRAY32 => WireTag::Array32,
            TAG_MAP16 => WireTag::Map16,
            TAG_MAP32 => WireTag::Map32,
            0xe0..=0xff => WireTag::NegativeFixInt(b as i8),
        };
        Some(tag)
    }

    /// Байт тега. Для fix-форм значение/длина упаковываются в него.
    pub const fn to_byte(self) -> u8 {
        match self {
            WireTag::PositiveFixInt(n) => n & TAG_POSITIVE_FIXINT_MAX,
            WireTag::NegativeFixInt(n) => n as u8,
            WireTag::FixMap(n) => TAG_FIXMAP | (n & 0x0f),
            WireTag::FixArray(n) => TAG_FIXARRAY | (n & 0x0f),
            WireTag::FixStr(n) => TAG_FIXSTR | (n & 0x1f),
            WireTag::Nil => TAG_NIL,
            WireTag::False => TAG_FALSE,
            WireTag::True => TAG_TRUE,
            WireTag::Bin8 => TAG_BIN8,
            WireTag::Bin16 => TAG_BIN16,
            WireTag::Bin32 => TAG_BIN32,
            WireTag::Ext8 => TAG_EXT8,
            WireTag::Ext16 => TAG_EXT16,
            WireTag::Ext32 => TAG_EXT32,
            WireTag::Float32 => TAG_FLOAT32,
            WireTag::Float64 => TAG_FLOAT64,
            WireTag::UInt8 => TAG_UINT8,
            WireTag::UInt16 => TAG_UINT16,
            WireTag::UInt32 => TAG_UINT32,
            WireTag::UInt64 => TAG_UINT64,
            WireTag::Int8 => TAG_INT8,
            WireTag::Int16 => TAG_INT16,
            WireTag::Int32 => TAG_INT32,
            WireTag::Int64 => TAG_INT64,
            WireTag::FixExt1 => TAG_FIXEXT1,
            WireTag::FixExt2 => TAG_FIXEXT2,
            WireTag::FixExt4 => TAG_FIXEXT4,
            WireTag::FixExt8 => TAG_FIXEXT8,
            WireTag::FixExt16 => TAG_FIXEXT16,
            WireTag::Str8 => TAG_STR8,
            WireTag::Str16 => TAG_STR16,
            WireTag::Str32 => TAG_STR32,
            WireTag::Array16 => TAG_ARRAY16,
            WireTag::Array32 => TAG_ARRAY32,
            WireTag::Map16 => TAG_MAP16,
            WireTag::Map32 => TAG_MAP32,
        }
    }

    /// Ширина поля длины (в байтах), которое следует за тегом.
    ///
    /// Для fix-форм длина зашита в сам тег, для скаляров поля длины нет.
    pub const fn length_width(self) -> usize {
        match self {
            WireTag::Str8 | WireTag::Bin8 | WireTag::Ext8 => 1,
            WireTag::Str16
            | WireTag::Bin16
            | WireTag::Ext16
            | WireTag::Array16
            | WireTag::Map16 => 2,
            WireTag::Str32
            | WireTag::Bin32
            | WireTag::Ext32
            | WireTag::Array32
            | WireTag::Map32 => 4,
            _ => 0,
        }
    }

    /// Длина полезной нагрузки fixext-форм.
    pub const fn fixext_len(self) -> Option<usize> {
        match self {
            WireTag::FixExt1 => Some(1),
            WireTag::FixExt2 => Some(2),
            WireTag::FixExt4 => Some(4),
            WireTag::FixExt8 => Some(8),
            WireTag::FixExt16 => Some(16),
            _ => None,
        }
    }
}

/// Минимальный тег для знакового целого.
///
/// Неотрицательные числа кодируются беззнаковыми формами, как того требует
/// MessagePack.
pub const fn int_tag(n: i64) -> WireTag {
    if n >= 0 {
        return uint_tag(n as u64);
    }
    if n >= -32 {
        WireTag::NegativeFixInt(n as i8)
    } else if n >= i8::MIN as i64 {
        WireTag::Int8
    } else if n >= i16::MIN as i64 {
        WireTag::Int16
    } else if n >= i32::MIN as i64 {
        WireTag::Int32
    } else {
        WireTag::Int64
    }
}

/// Минимальный тег для беззнакового целого.
pub const fn uint_tag(n: u64) -> WireTag {
    if n <= TAG_POSITIVE_FIXINT_MAX as u64 {
        WireTag::PositiveFixInt(n as u8)
    } else if n <= u8::MAX as u64 {
        WireTag::UInt8
    } else if n <= u16::MAX as u64 {
        WireTag::UInt16
    } else if n <= u32::MAX as u64 {
        WireTag::UInt32
    } else {
        WireTag::UInt64
    }
}

/// Минимальный тег строки по длине в байтах UTF-8.
pub fn str_tag(len: usize) -> Result<WireTag, EncodeError> {
    Ok(match len {
        0..=31 => WireTag::FixStr(len as u8),
        32..=0xff => WireTag::Str8,
        0x100..=0xffff => WireTag::Str16,
        _ => {
            check_u32_len("string", len)?;
            WireTag::Str32
        }
    })
}

/// Минимальный тег бинарных данных.
pub fn bin_tag(len: usize) -> Result<WireTag, EncodeError> {
    Ok(match len {
        0..=0xff => WireTag::Bin8,
        0x100..=0xffff => WireTag::Bin16,
        _ => {
            check_u32_len("binary", len)?;
            WireTag::Bin32
        }
    })
}

/// Минимальный тег массива по числу элементов.
pub fn array_tag(len: usize) -> Result<WireTag, EncodeError> {
    Ok(match len {
        0..=15 => WireTag::FixArray(len as u8),
        16..=0xffff => WireTag::Array16,
        _ => {
            check_u32_len("array", len)?;
            WireTag::Array32
        }
    })
}

/// Минимальный тег map по числу пар.
pub fn map_tag(len: usize) -> Result<WireTag, EncodeError> {
    Ok(match len {
        0..=15 => WireTag::FixMap(len as u8),
        16..=0xffff => WireTag::Map16,
        _ => {
            check_u32_len("map", len)?;
            WireTag::Map32
        }
    })
}

/// Минимальный заголовок расширения по длине полезной нагрузки.
///
/// Длины 1, 2, 4, 8 и 16 байт помещаются в fixext-формы.
pub fn ext_tag(len: usize) -> Result<WireTag, EncodeError> {
    Ok(match len {
        1 => WireTag::FixExt1,
        2 => WireTag::FixExt2,
        4 => WireTag::FixExt4,
        8 => WireTag::FixExt8,
        16 => WireTag::FixExt16,
        0..=0xff => WireTag::Ext8,
        0x100..=0xffff => WireTag::Ext16,
        _ => {
            check_u32_len("extension", len)?;
            WireTag::Ext32
        }
    })
}

/// Тег, которым кодируется значение.
///
/// Для массивов возвращается тег обычного массива: решение о табличной форме
/// принимает кодировщик.
pub fn tag_for(value: &Value) -> Result<WireTag, EncodeError> {
    match value {
        Value::Null => Ok(WireTag::Nil),
        Value::Bool(false) => Ok(WireTag::False),
        Value::Bool(true) => Ok(WireTag::True),
        Value::Int(n) => Ok(int_tag(*n)),
        Value::UInt(n) => Ok(uint_tag(*n)),
        Value::Float(_) => Ok(WireTag::Float64),
        Value::Str(s) => str_tag(s.len()),
        Value::Binary(b) => bin_tag(b.len()),
        Value::Array(items) => array_tag(items.len()),
        Value::Map(entries) => map_tag(entries.len()),
    }
}

/// Разбирает байт тега при декодировании. Неизвестный байт — ошибка.
pub fn value_kind_for(
    tag: u8,
    offset: usize,
) -> Result<WireTag, DecodeError> {
    WireTag::from_byte(tag).ok_or(DecodeError::UnknownTag { tag, offset })
}

fn check_u32_len(
    what: &str,
    len: usize,
) -> Result<(), EncodeError> {
    if u32::try_from(len).is_err() {
        return Err(EncodeError::unsupported(
            what,
            format!("length {len} exceeds the 32-bit length field"),
        ));
    }
    Ok(())
}
