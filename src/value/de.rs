use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use super::Value;

/// Deserializes from any self-describing format. Map entries keep the order
/// in which the source format yields them.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("any BTOON-compatible value")
    }

    fn visit_bool<E>(
        self,
        v: bool,
    ) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(
        self,
        v: i64,
    ) -> Result<Value, E> {
        Ok(Value::Int(v))
    }

    fn visit_u64<E>(
        self,
        v: u64,
    ) -> Result<Value, E> {
        // Как и декодер: всё, что помещается в i64, становится Int
        Ok(i64::try_from(v).map_or(Value::UInt(v), Value::Int))
    }

    fn visit_f64<E>(
        self,
        v: f64,
    ) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E>(
        self,
        v: &str,
    ) -> Result<Value, E> {
        Ok(Value::Str(v.to_owned()))
    }

    fn visit_string<E>(
        self,
        v: String,
    ) -> Result<Value, E> {
        Ok(Value::Str(v))
    }

    fn visit_bytes<E>(
        self,
        v: &[u8],
    ) -> Result<Value, E> {
        Ok(Value::Binary(v.to_vec()))
    }

    fn visit_byte_buf<E>(
        self,
        v: Vec<u8>,
    ) -> Result<Value, E> {
        Ok(Value::Binary(v))
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(4096));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> Result<Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0).min(4096));
        while let Some((k, v)) = map.next_entry()? {
            entries.push((k, v));
        }
        Ok(Value::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_json_text_keeps_order() {
        let v: Value = serde_json::from_str(r#"{"b":1,"a":"x","c":[null,true,2.5]}"#).unwrap();
        assert_eq!(
            v,
            Value::map([
                ("b", Value::Int(1)),
                ("a", Value::from("x")),
                (
                    "c",
                    Value::Array(vec![Value::Null, Value::Bool(true), Value::Float(2.5)])
                ),
            ])
        );
    }

    #[test]
    fn test_deserialize_large_unsigned() {
        let v: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert!(matches!(v, Value::UInt(u64::MAX)));

        let v: Value = serde_json::from_str("-7").unwrap();
        assert!(matches!(v, Value::Int(-7)));
    }
}
