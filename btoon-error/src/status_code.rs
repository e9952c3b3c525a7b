use std::fmt;

use num_enum::TryFromPrimitive;
#[cfg(feature = "serde")]
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Коды статуса для категоризации ошибок кодека.
///
/// # Диапазоны:
/// - 0xxx: Успех
/// - 1xxx: Общие ошибки
/// - 2xxx: Ошибки данных
/// - 5xxx: Сериализация / сжатие
/// - 8xxx: Ошибки формата
///
/// `num_enum::TryFromPrimitive` даёт нативную реализацию `TryFrom<u32>`,
/// опционально `serde_repr` сериализует код числом (feature = "serde").
#[cfg_attr(feature = "serde", derive(Serialize_repr, Deserialize_repr))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
pub enum StatusCode {
    // === 0xxx: Успех ===
    Success = 0,

    // === 1xxx: Общие ошибки ===
    Unknown = 1000,
    Internal = 1003,

    // === 2xxx: Ошибки данных ===
    InvalidData = 2009,

    // === 5xxx: Сериализация/сжатие ===
    SerializationFailed = 5003,
    CompressionFailed = 5005,

    // === 8xxx: Формат ===
    UnexpectedEof = 8000,
    UnknownTag = 8001,
    InvalidUtf8 = 8004,
    SizeLimit = 8007,
    DepthLimit = 8008,
    EncodingError = 8010,
    DecodingError = 8011,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl StatusCode {
    /// Числовое представление кода статуса.
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Пытается получить вариант `StatusCode` из `u32`.
    ///
    /// Возвращает `None`, если значение не соответствует ни одному варианту.
    pub fn from_u32(v: u32) -> Option<Self> {
        Self::try_from(v).ok()
    }

    /// Вернёт `true`, если переданный `code` означает успешный результат.
    pub fn is_success(code: u32) -> bool {
        Self::Success as u32 == code
    }

    /// Является ли код ошибкой со стороны вызывающего — проблема во входных
    /// данных (диапазоны `2xxx` и `8xxx`).
    pub fn is_client_error(&self) -> bool {
        (2000..=2999).contains(&self.code()) || self.is_format_error()
    }

    /// Является ли код внутренней ошибкой (`1xxx` и `5xxx`).
    pub fn is_server_error(&self) -> bool {
        matches!(self.code(), 1000..=1999 | 5000..=5999)
    }

    /// Ошибка разбора или построения бинарного формата (диапазон 8xxx).
    pub fn is_format_error(&self) -> bool {
        (8000..=8999).contains(&self.code())
    }

    /// HTTP-статус, соответствующий коду статуса.
    ///
    /// Используется слоем, который отдаёт результаты кодека по HTTP.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Success => 200,
            Self::InvalidData
            | Self::UnexpectedEof
            | Self::UnknownTag
            | Self::InvalidUtf8
            | Self::DepthLimit
            | Self::DecodingError => 400,
            Self::SizeLimit => 413,
            Self::EncodingError => 422,
            _ => 500,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для StatusCode
////////////////////////////////////////////////////////////////////////////////

impl From<StatusCode> for u32 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет разделение клиентских и внутренних ошибок.
    #[test]
    fn test_client_vs_server() {
        assert!(StatusCode::UnknownTag.is_client_error());
        assert!(StatusCode::InvalidData.is_client_error());
        assert!(StatusCode::Internal.is_server_error());
        assert!(StatusCode::CompressionFailed.is_server_error());
        assert!(!StatusCode::DepthLimit.is_server_error());
        assert!(!StatusCode::Success.is_client_error());
        assert!(!StatusCode::Success.is_server_error());
    }

    /// Тест проверяет соответствие кодов HTTP-статусам.
    #[test]
    fn test_http_mapping() {
        assert_eq!(StatusCode::UnexpectedEof.http_status(), 400);
        assert_eq!(StatusCode::DecodingError.http_status(), 400);
        assert_eq!(StatusCode::SizeLimit.http_status(), 413);
        assert_eq!(StatusCode::EncodingError.http_status(), 422);
        assert_eq!(StatusCode::Internal.http_status(), 500);
    }

    /// Тест проверяет конвертацию через `TryFrom<u32>` и вспомогательную
    /// `from_u32`.
    #[test]
    fn test_from_try_from_u32() {
        let n = StatusCode::UnknownTag.code();
        assert_eq!(StatusCode::try_from(n).unwrap(), StatusCode::UnknownTag);
        assert!(StatusCode::from_u32(99999).is_none());
        // 1001 и 8009 не используются ни одной ошибкой кодека.
        assert!(StatusCode::from_u32(1001).is_none());
        assert!(StatusCode::from_u32(8009).is_none());
    }

    #[test]
    fn test_code_and_into() {
        let c = StatusCode::InvalidUtf8;
        assert_eq!(c.code(), 8004);
        let n: u32 = c.into();
        assert_eq!(n, 8004);
        assert!(StatusCode::is_success(StatusCode::Success.code()));
        assert!(!StatusCode::is_success(StatusCode::UnknownTag.code()));
    }

    /// Тест проверяет определение ошибок формата (диапазон 8xxx).
    #[test]
    fn test_is_format_error() {
        assert!(StatusCode::DepthLimit.is_format_error());
        assert!(!StatusCode::CompressionFailed.is_format_error());
    }

    /// Тест проверяет формат `Display` — строка должна содержать имя варианта и
    /// числовой код.
    #[test]
    fn test_display_contains_name_and_code() {
        let s = format!("{}", StatusCode::UnknownTag);
        assert!(s.contains("8001"), "Display must contain code 8001, got: {s}");
        assert!(
            s.contains("UnknownTag"),
            "Display must contain variant name 'UnknownTag', got: {s}"
        );
    }
}
