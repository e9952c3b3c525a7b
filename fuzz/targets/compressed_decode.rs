#![no_main]

use arbitrary::Arbitrary;
use btoon::{decode, DecodeOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct CompressedFuzzInput {
    /// Повреждённые zlib-данные
    corrupt_zlib_data: Vec<u8>,
    /// Предел распакованного размера
    limit: u16,
}

fuzz_target!(|input: CompressedFuzzInput| {
    let opts = DecodeOptions::default()
        .with_decompress(true)
        .with_max_decompressed_size(input.limit as u64);

    // Повреждённый поток или превышение предела — ошибка, но не паника.
    let _ = decode(&input.corrupt_zlib_data, &opts);
});
