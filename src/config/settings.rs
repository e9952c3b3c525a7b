use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::codec::{
    options::{DEFAULT_MAX_DECOMPRESSED_SIZE, DEFAULT_MAX_TABLE_EXPANSION},
    DecodeOptions, EncodeOptions,
};

/// Параметры кодека, собранные из значений по умолчанию, файла и окружения.
///
/// Переменные окружения имеют префикс `BTOON_`, вложенность разделяется `__`:
/// `BTOON_ENCODE__AUTO_TABULAR=false`, `BTOON_DECODE__MAX_DEPTH=64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub encode: EncodeOptions,
    pub decode: DecodeOptions,
}

impl Settings {
    /// Значения по умолчанию, переопределённые окружением.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(None)
    }

    /// То же, что [`Settings::load`], но сначала читается файл (формат
    /// определяется по расширению: toml, json, yaml и т.д.).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(Some(path.as_ref()))
    }

    fn build(file: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            // Добавляем значения по умолчанию
            .set_default("encode.compress", defaults.encode.compress)?
            .set_default("encode.auto_tabular", defaults.encode.auto_tabular)?
            .set_default(
                "encode.compression_level",
                defaults.encode.compression_level as u64,
            )?
            .set_default("encode.max_depth", defaults.encode.max_depth as u64)?
            .set_default("decode.decompress", defaults.decode.decompress)?
            .set_default("decode.strict_utf8", defaults.decode.strict_utf8)?
            .set_default("decode.max_depth", defaults.decode.max_depth as u64)?
            .set_default(
                "decode.max_decompressed_size",
                DEFAULT_MAX_DECOMPRESSED_SIZE,
            )?
            .set_default("decode.max_table_expansion", DEFAULT_MAX_TABLE_EXPANSION)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Переменные окружения с префиксом BTOON_ перекрывают всё остальное
        let cfg = builder
            .add_source(
                Environment::with_prefix("BTOON")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        cfg.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::{env, io::Write};

    use serial_test::serial;
    use tempfile::Builder;

    use super::*;

    const VARS: [&str; 4] = [
        "BTOON_ENCODE__AUTO_TABULAR",
        "BTOON_DECODE__MAX_DEPTH",
        "BTOON_ENCODE__COMPRESS",
        "BTOON_DECODE__MAX_TABLE_EXPANSION",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();
        let s = Settings::load().unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("BTOON_ENCODE__AUTO_TABULAR", "false");
        env::set_var("BTOON_DECODE__MAX_DEPTH", "64");
        env::set_var("BTOON_DECODE__MAX_TABLE_EXPANSION", "1048576");
        let s = Settings::load();
        clear_env();

        let s = s.unwrap();
        assert!(!s.encode.auto_tabular);
        assert_eq!(s.decode.max_depth, 64);
        assert_eq!(s.decode.max_table_expansion, 1_048_576);
        assert!(s.decode.strict_utf8);
    }

    #[test]
    #[serial]
    fn test_file_then_env() {
        clear_env();
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[encode]\ncompress = true\ncompression_level = 9\n\n[decode]\nstrict_utf8 = false"
        )
        .unwrap();

        let s = Settings::from_file(file.path()).unwrap();
        assert!(s.encode.compress);
        assert_eq!(s.encode.compression_level, 9);
        assert!(!s.decode.strict_utf8);
        assert!(s.encode.auto_tabular);

        env::set_var("BTOON_ENCODE__COMPRESS", "false");
        let s = Settings::from_file(file.path());
        clear_env();
        assert!(!s.unwrap().encode.compress);
    }

    #[test]
    #[serial]
    fn test_missing_file_is_error() {
        clear_env();
        assert!(Settings::from_file("/nonexistent/btoon.toml").is_err());
    }
}
