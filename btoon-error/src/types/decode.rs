use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибка разбора BTOON-буфера.
///
/// Все смещения (`offset`) — абсолютные позиции во входном (уже распакованном)
/// буфере, на которых ошибка была обнаружена.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Байт тега не соответствует ни одному типу MessagePack (0xc1).
    #[error("Unknown tag 0x{tag:02X} at offset {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// Расширение с типом, отличным от табличного (-1).
    #[error("Unknown extension type {ext_type} at offset {offset}")]
    UnknownExtType { ext_type: i8, offset: usize },

    /// Буфер закончился посреди поля фиксированной ширины.
    #[error("Truncated input while reading {context} at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedInput {
        context: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Объявленная длина полезной нагрузки выходит за конец буфера.
    #[error("Declared {what} length {declared} overruns buffer at offset {offset} ({available} bytes available)")]
    LengthOverrun {
        what: &'static str,
        declared: u64,
        available: usize,
        offset: usize,
    },

    /// Сжатый поток повреждён.
    #[error("Corrupt compressed stream: {reason}")]
    CorruptCompressedStream { reason: String },

    /// Строка содержит некорректный UTF-8.
    #[error("Invalid UTF-8 at offset {offset}: {reason}")]
    InvalidUtf8 { offset: usize, reason: String },

    /// Вложенность превышает допустимую.
    #[error("Depth limit exceeded: {current} > {max}")]
    DepthLimit { current: usize, max: usize },

    /// Табличное расширение синтаксически разобрано, но нарушает свои
    /// инварианты.
    #[error("Malformed table at offset {offset}: {reason}")]
    MalformedTable { reason: String, offset: usize },

    /// После первого значения в буфере остались байты.
    #[error("{remaining} trailing bytes after value at offset {offset}")]
    TrailingBytes { offset: usize, remaining: usize },

    /// Превышен лимит размера (например, распакованного буфера).
    #[error("{what} size {size} exceeds limit {limit} bytes")]
    SizeLimit { what: &'static str, size: u64, limit: u64 },
}

impl DecodeError {
    /// Смещение, на котором обнаружена ошибка, если оно известно.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnknownTag { offset, .. }
            | Self::UnknownExtType { offset, .. }
            | Self::TruncatedInput { offset, .. }
            | Self::LengthOverrun { offset, .. }
            | Self::InvalidUtf8 { offset, .. }
            | Self::MalformedTable { offset, .. }
            | Self::TrailingBytes { offset, .. } => Some(*offset),
            Self::CorruptCompressedStream { .. }
            | Self::DepthLimit { .. }
            | Self::SizeLimit { .. } => None,
        }
    }

    /// Ошибка вызвана тем, что буфер оборван раньше, чем закончилось значение.
    pub fn is_truncation(&self) -> bool {
        matches!(
            self,
            Self::TruncatedInput { .. } | Self::LengthOverrun { .. }
        )
    }
}

impl ErrorExt for DecodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownTag { .. } | Self::UnknownExtType { .. } => StatusCode::UnknownTag,
            Self::TruncatedInput { .. } | Self::LengthOverrun { .. } => StatusCode::UnexpectedEof,
            Self::CorruptCompressedStream { .. } => StatusCode::DecodingError,
            Self::InvalidUtf8 { .. } => StatusCode::InvalidUtf8,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
            Self::MalformedTable { .. } | Self::TrailingBytes { .. } => StatusCode::InvalidData,
            Self::SizeLimit { .. } => StatusCode::SizeLimit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
