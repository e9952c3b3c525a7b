#![no_main]

use arbitrary::Unstructured;
use btoon::{decode, encode, DecodeOptions, EncodeOptions, Value};
use libfuzzer_sys::fuzz_target;

/// Генерация произвольного Value из `Unstructured` с ограничением глубины.
fn arb_value(
    u: &mut Unstructured<'_>,
    depth: usize,
) -> arbitrary::Result<Value> {
    let max_choice = if depth == 0 { 6 } else { 9 };
    let value = match u.int_in_range::<u8>(0..=max_choice)? {
        0 => Value::Null,
        1 => Value::Bool(u.arbitrary()?),
        2 => Value::Int(u.arbitrary()?),
        3 => Value::UInt(u.arbitrary()?),
        4 => Value::Float(u.arbitrary()?),
        5 => Value::Str(u.arbitrary()?),
        6 => Value::Binary(u.arbitrary()?),
        7 => {
            let len = u.int_in_range::<usize>(0..=8)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(arb_value(u, depth - 1)?);
            }
            Value::Array(items)
        }
        8 => {
            let len = u.int_in_range::<usize>(0..=8)?;
            let mut entries = Vec::with_capacity(len);
            for _ in 0..len {
                entries.push((arb_value(u, depth - 1)?, arb_value(u, depth - 1)?));
            }
            Value::Map(entries)
        }
        _ => {
            // Табличный кандидат: одинаковые ключи, примитивные значения.
            let rows = u.int_in_range::<usize>(0..=6)?;
            let columns: Vec<String> = (0..u.int_in_range::<usize>(1..=4)?)
                .map(|i| format!("c{i}"))
                .collect();
            let mut items = Vec::with_capacity(rows);
            for _ in 0..rows {
                let mut entries = Vec::with_capacity(columns.len());
                for c in &columns {
                    entries.push((Value::from(c.as_str()), arb_value(u, 0)?));
                }
                items.push(Value::Map(entries));
            }
            Value::Array(items)
        }
    };
    Ok(value)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(value) = arb_value(&mut u, 4) else {
        return;
    };
    let compress = u.arbitrary::<bool>().unwrap_or(false);
    let auto_tabular = u.arbitrary::<bool>().unwrap_or(true);

    let opts = EncodeOptions::default()
        .with_compress(compress)
        .with_auto_tabular(auto_tabular);
    let bytes = encode(&value, &opts).expect("encode failed");
    let decoded = decode(&bytes, &DecodeOptions::default().with_decompress(compress))
        .expect("decode failed");

    // NaN ломает сравнение значений, поэтому сравниваем повторное кодирование.
    let plain = EncodeOptions::default().with_auto_tabular(auto_tabular);
    assert_eq!(
        encode(&value, &plain).expect("encode failed"),
        encode(&decoded, &plain).expect("encode failed")
    );
});
