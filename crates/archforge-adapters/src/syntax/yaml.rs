//! YAML rendering, single and multi-document.

use serde::Serialize;

use archforge_core::error::{ArchforgeResult, Context};

use super::comment_block;

/// Serialize one document.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> ArchforgeResult<String> {
    serde_yaml::to_string(value).context("serializing YAML")
}

/// Serialize several documents separated by `---`.
pub fn to_multi_document<T: Serialize>(documents: &[T]) -> ArchforgeResult<String> {
    let mut out = String::new();
    for (i, doc) in documents.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&to_yaml(doc)?);
    }
    Ok(out)
}

/// Prefix `body` with `#` comment lines.
pub fn with_header(lines: &[String], body: &str) -> String {
    let mut out = comment_block(lines);
    out.push_str(body);
    out
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn multi_document_parses_back() {
        let text = to_multi_document(&[json!({"kind": "Namespace"}), json!({"kind": "Service"})]).unwrap();
        let docs: Vec<serde_yaml::Value> = serde_yaml::Deserializer::from_str(&text)
            .map(serde_yaml::Value::deserialize)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1]["kind"], serde_yaml::Value::from("Service"));
    }

    #[test]
    fn header_lines_are_comments() {
        let text = with_header(&["Generated".into(), String::new()], "a: 1\n");
        assert_eq!(text, "# Generated\n#\na: 1\n");
    }

    #[test]
    fn multiline_comment_stays_commented() {
        let text = with_header(&["shop\nname: injected".into()], "a: 1\n");
        assert_eq!(text, "# shop\n# name: injected\na: 1\n");
        let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
        assert!(parsed.get("name").is_none());
    }
}
