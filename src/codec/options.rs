//! Параметры вызовов `encode` и `decode`.
//!
//! Обе структуры (де)сериализуются через serde, поэтому их можно принимать
//! прямо из JSON-запроса или из файла настроек. Поддерживаются и camelCase
//! имена, которые использует JS-обвязка (`autoTabular` и т.п.).

use serde::{Deserialize, Serialize};

/// Максимальная вложенность массивов и map по умолчанию.
pub const DEFAULT_MAX_DEPTH: usize = 128;
/// Уровень zlib по умолчанию.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;
/// Предел размера распакованного буфера (512 МБ).
pub const DEFAULT_MAX_DECOMPRESSED_SIZE: u64 = 512 * 1024 * 1024;
/// Предел памяти, которую может занять развёрнутая таблица (256 МБ).
pub const DEFAULT_MAX_TABLE_EXPANSION: u64 = 256 * 1024 * 1024;

/// Параметры кодирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Сжать итоговый буфер zlib.
    pub compress: bool,
    /// Кодировать подходящие массивы map таблицей.
    #[serde(alias = "autoTabular")]
    pub auto_tabular: bool,
    /// Уровень сжатия zlib, 0..=9.
    #[serde(alias = "compressionLevel")]
    pub compression_level: u32,
    /// Допустимая вложенность дерева значений.
    #[serde(alias = "maxDepth")]
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compress: false,
            auto_tabular: true,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EncodeOptions {
    pub fn with_compress(
        mut self,
        compress: bool,
    ) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_auto_tabular(
        mut self,
        auto_tabular: bool,
    ) -> Self {
        self.auto_tabular = auto_tabular;
        self
    }

    /// Уровень больше 9 приводится к 9.
    pub fn with_compression_level(
        mut self,
        level: u32,
    ) -> Self {
        self.compression_level = level.min(9);
        self
    }

    pub fn with_max_depth(
        mut self,
        max_depth: usize,
    ) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Параметры декодирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Распаковать zlib перед разбором.
    pub decompress: bool,
    /// Допустимая вложенность.
    #[serde(alias = "maxDepth")]
    pub max_depth: usize,
    /// `true` — некорректный UTF-8 в строке является ошибкой, `false` —
    /// строка восстанавливается с заменой битых последовательностей.
    #[serde(alias = "strictUtf8")]
    pub strict_utf8: bool,
    /// Предел размера распакованных данных.
    #[serde(alias = "maxDecompressedSize")]
    pub max_decompressed_size: u64,
    /// Предел оценки памяти под строки таблицы после разворачивания в
    /// массив map. Имя каждой колонки копируется в каждую строку, поэтому
    /// небольшая таблица может развернуться в гигабайты.
    #[serde(alias = "maxTableExpansion")]
    pub max_table_expansion: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            decompress: false,
            max_depth: DEFAULT_MAX_DEPTH,
            strict_utf8: true,
            max_decompressed_size: DEFAULT_MAX_DECOMPRESSED_SIZE,
            max_table_expansion: DEFAULT_MAX_TABLE_EXPANSION,
        }
    }
}

impl DecodeOptions {
    pub fn with_decompress(
        mut self,
        decompress: bool,
    ) -> Self {
        self.decompress = decompress;
        self
    }

    pub fn with_max_depth(
        mut self,
        max_depth: usize,
    ) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_utf8(
        mut self,
        strict_utf8: bool,
    ) -> Self {
        self.strict_utf8 = strict_utf8;
        self
    }

    pub fn with_max_decompressed_size(
        mut self,
        limit: u64,
    ) -> Self {
        self.max_decompressed_size = limit;
        self
    }

    pub fn with_max_table_expansion(
        mut self,
        limit: u64,
    ) -> Self {
        self.max_table_expansion = limit;
        self
    }
}
