// Lenient field decoders shared by socket frames and HTTP responses.
//
// The backend is loose about scalar types: ids arrive as numbers or strings,
// adoption flags as `true`/`false` or `0`/`1`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number or string, rendered as a string.
pub(crate) fn string_or_number<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Integer or numeric string. Anything else is `None`.
pub(crate) fn opt_id<'de, D>(de: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_id(&Value::deserialize(de)?))
}

pub(crate) fn value_to_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `true` or a non-zero number. Everything else, `null` included, is false.
pub(crate) fn truthy_flag<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    })
}
