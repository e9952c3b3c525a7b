#![no_main]

use arbitrary::Arbitrary;
use btoon::{codec::DEFAULT_MAX_DEPTH, decode, encode, DecodeOptions, EncodeOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    data: Vec<u8>,
    strict_utf8: bool,
    max_depth: u8,
}

fuzz_target!(|input: FuzzInput| {
    let opts = DecodeOptions::default()
        .with_strict_utf8(input.strict_utf8)
        .with_max_depth((input.max_depth as usize).min(DEFAULT_MAX_DEPTH));

    // Декодер не должен паниковать ни на каких данных.
    let Ok(value) = decode(&input.data, &opts) else {
        return;
    };

    // Всё, что декодировалось, кодируется обратно и снова декодируется в то
    // же самое значение (NaN не сравнивается сам с собой, поэтому сравниваем
    // байты второго кодирования).
    let first = encode(&value, &EncodeOptions::default()).expect("re-encode failed");
    let again = decode(&first, &DecodeOptions::default().with_strict_utf8(false))
        .expect("decode of own output failed");
    let second = encode(&again, &EncodeOptions::default()).expect("second encode failed");
    assert_eq!(first, second);
});
