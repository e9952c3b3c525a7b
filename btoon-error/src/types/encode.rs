use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибка кодирования значения в BTOON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Значение не укладывается в модель формата (например, длина больше
    /// 32-битного поля длины).
    #[error("Unsupported value {what}: {reason}")]
    UnsupportedValue { what: String, reason: String },

    /// Вложенность дерева значений превышает допустимую.
    #[error("Depth limit exceeded: {current} > {max}")]
    DepthLimit { current: usize, max: usize },

    /// Сбой компрессора.
    #[error("Compression error: {reason}")]
    Compression { reason: String },

    /// Ошибка записи в выходной поток.
    #[error("I/O error: {reason}")]
    Io { reason: String },
}

impl EncodeError {
    pub fn unsupported(
        what: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedValue {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> Self {
        EncodeError::Io {
            reason: e.to_string(),
        }
    }
}

impl ErrorExt for EncodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedValue { .. } => StatusCode::EncodingError,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
            Self::Compression { .. } => StatusCode::CompressionFailed,
            Self::Io { .. } => StatusCode::SerializationFailed,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
