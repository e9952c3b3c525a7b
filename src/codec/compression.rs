//! Сжатие и распаковка закодированных буферов (zlib/deflate).
//!
//! Кодек сжимает весь закодированный буфер целиком. Формат потока — zlib
//! (RFC 1950), поэтому его понимает любая стандартная реализация.
//!
//! Распаковка ограничена по размеру результата: маленький сжатый вход может
//! развернуться в гигабайты.

use std::io::{Read, Write};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use tracing::debug;

use btoon_error::{DecodeError, EncodeError};

use super::options::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_MAX_DECOMPRESSED_SIZE};

/// Сжимает блок с заданным уровнем (0..=9, больше 9 приводится к 9).
pub fn compress_block(
    data: &[u8],
    level: u32,
) -> Result<Vec<u8>, EncodeError> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 16),
        Compression::new(level.min(9)),
    );
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| EncodeError::Compression {
            reason: e.to_string(),
        })
}

/// Распаковывает zlib-блок, но не больше `limit` байт.
pub fn decompress_block(
    data: &[u8],
    limit: u64,
) -> Result<Vec<u8>, DecodeError> {
    if data.is_empty() {
        return Err(DecodeError::CorruptCompressedStream {
            reason: "empty input".to_string(),
        });
    }

    // Читаем на байт больше лимита, чтобы отличить «ровно лимит» от
    // «больше лимита».
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .take(limit.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::CorruptCompressedStream {
            reason: e.to_string(),
        })?;

    if out.len() as u64 > limit {
        return Err(DecodeError::SizeLimit {
            what: "decompressed buffer",
            size: out.len() as u64,
            limit,
        });
    }
    Ok(out)
}

/// Сжимает буфер уровнем по умолчанию.
pub fn compress(data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let out = compress_block(data, DEFAULT_COMPRESSION_LEVEL)?;
    debug!(input = data.len(), output = out.len(), "compressed buffer");
    Ok(out)
}

/// Распаковывает буфер с пределом по умолчанию.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decompress_block(data, DEFAULT_MAX_DECOMPRESSED_SIZE)
}
