//! JSON rendering.
//!
//! Documents are built as `serde_json::Value` trees; key order is the
//! insertion order (`preserve_order`).

use serde::Serialize;
use serde_json::Value;

use archforge_core::error::{ArchforgeResult, Context};

/// Pretty-print with two-space indentation and a trailing newline.
pub fn to_pretty<T: Serialize + ?Sized>(value: &T) -> ArchforgeResult<String> {
    let mut text = serde_json::to_string_pretty(value).context("serializing JSON")?;
    text.push('\n');
    Ok(text)
}

/// Build an object from `(key, value)` pairs, keeping their order.
pub fn object<K, I>(entries: I) -> Value
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let value = object([("zeta", json!(1)), ("alpha", json!(2))]);
        let text = to_pretty(&value).unwrap();
        assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
        assert!(text.ends_with("}\n"));
    }
}
