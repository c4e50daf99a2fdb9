//! One serializer per target syntax.
//!
//! Fragment generators produce trees; these modules turn trees into text.

pub mod hcl;
pub mod json;
pub mod yaml;

/// Header lines stamped at the top of every generated file.
pub fn header_lines(title: &str, project: &str, timestamp: &str) -> Vec<String> {
    vec![
        format!("{title} for {project}"),
        format!("Generated by archforge at {timestamp}"),
        "Review before applying; placeholder values are not production-safe.".to_string(),
    ]
}

/// Split free text into lines that stay inside a `#` comment.
///
/// Every line break starts a new line; other control characters become spaces.
pub fn comment_text_lines(text: &str) -> Vec<String> {
    text.split(['\n', '\r'])
        .map(|line| {
            line.chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect()
}

/// `#`-prefixed lines, each terminated by a newline; embedded line breaks
/// become extra comment lines. Valid in HCL, YAML, shell and dotenv files.
pub fn comment_block(lines: &[String]) -> String {
    lines
        .iter()
        .flat_map(|line| comment_text_lines(line))
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_breaks_split_comment_text() {
        assert_eq!(comment_text_lines("Web\nServer"), vec!["Web", "Server"]);
        assert_eq!(comment_text_lines("a\r\nb"), vec!["a", "", "b"]);
        assert_eq!(comment_text_lines("tab\there"), vec!["tab here"]);
        assert_eq!(comment_text_lines(""), vec![""]);
    }
}
