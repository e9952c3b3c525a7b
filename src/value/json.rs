//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! Boundary layers usually receive JSON; these conversions are how such input
//! is normalized into the closed value model before encoding.

use serde_json::Value as Json;

use super::Value;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    // serde_json без arbitrary_precision всегда даёт f64
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Renders the value as JSON.
    ///
    /// Binary becomes an array of byte values and non-finite floats become
    /// `null`. Fails when a map key is itself an array or a map.
    pub fn to_json(&self) -> Result<Json, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_from_json_preserves_object_order() {
        let v = Value::from(json!({"id": 1, "name": "A", "score": 0.5}));
        let keys: Vec<_> = v
            .as_map()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, ["id", "name", "score"]);
    }

    #[test]
    fn test_json_roundtrip() {
        let src = json!([{"id": 1, "tags": ["x", "y"]}, {"id": -2, "tags": []}, null]);
        let v = Value::from(src.clone());
        assert_eq!(v.to_json().unwrap(), src);
    }

    #[test]
    fn test_to_json_non_finite_float_is_null() {
        assert_eq!(Value::Float(f64::INFINITY).to_json().unwrap(), Json::Null);
    }

    #[test]
    fn test_to_json_rejects_composite_key() {
        let v = Value::Map(vec![(Value::Map(vec![]), Value::Null)]);
        assert!(v.to_json().is_err());
    }
}
