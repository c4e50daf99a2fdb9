//! A small HCL document model and writer.
//!
//! Fragments build [`Block`] trees; only [`HclWriter`] knows about braces,
//! quoting and indentation. Consecutive attributes are aligned on `=` the
//! way `terraform fmt` does.

use std::fmt::Write as _;

use super::comment_text_lines;

/// An attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal string. `${` and `%{` are escaped so no interpolation happens.
    Str(String),
    /// A quoted template whose `${...}` sequences are interpolated by Terraform.
    Template(String),
    /// A bare expression such as `var.region` or `aws_vpc.main.id`.
    Raw(String),
    Int(i64),
    Bool(bool),
    List(Vec<Expr>),
    /// An object literal; keys keep insertion order.
    Object(Vec<(String, Expr)>),
}

impl Expr {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn template(value: impl Into<String>) -> Self {
        Self::Template(value.into())
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    /// `var.<name>`
    pub fn var(name: &str) -> Self {
        Self::Raw(format!("var.{name}"))
    }

    pub fn list<I, E>(items: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    fn is_multiline(&self) -> bool {
        match self {
            Self::Object(entries) => !entries.is_empty(),
            Self::List(items) => items.iter().any(Expr::is_multiline),
            _ => false,
        }
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One line-level entry in a block body.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyItem {
    Attr(String, Expr),
    Block(Block),
    Comment(String),
    Blank,
}

/// `kind "label" "label" { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: String,
    pub labels: Vec<String>,
    pub body: Vec<BodyItem>,
}

impl Block {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            labels: Vec::new(),
            body: Vec::new(),
        }
    }

    /// `resource "<type>" "<name>"`
    pub fn resource(resource_type: &str, name: &str) -> Self {
        Self::new("resource").label(resource_type).label(name)
    }

    /// `data "<type>" "<name>"`
    pub fn data(data_type: &str, name: &str) -> Self {
        Self::new("data").label(data_type).label(name)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.body.push(BodyItem::Attr(key.into(), value.into()));
        self
    }

    /// Add the attribute only when `value` is present.
    pub fn attr_opt(self, key: impl Into<String>, value: Option<Expr>) -> Self {
        match value {
            Some(value) => self.attr(key, value),
            None => self,
        }
    }

    pub fn block(mut self, block: Block) -> Self {
        self.body.push(BodyItem::Block(block));
        self
    }

    pub fn comment(mut self, text: impl Into<String>) -> Self {
        self.body.push(BodyItem::Comment(text.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.body.push(BodyItem::Blank);
        self
    }

    /// Address used in references, e.g. `aws_instance.api`.
    pub fn address(&self) -> String {
        match (self.kind.as_str(), self.labels.as_slice()) {
            ("resource", [ty, name]) => format!("{ty}.{name}"),
            ("data", [ty, name]) => format!("data.{ty}.{name}"),
            (_, labels) => labels.join("."),
        }
    }

    pub fn is_resource(&self) -> bool {
        self.kind == "resource"
    }
}

/// A top-level entry of an HCL file.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel {
    Block(Block),
    /// One or more `#` comment lines.
    Comment(Vec<String>),
}

/// Renders top-level items into HCL text.
#[derive(Debug, Default)]
pub struct HclWriter {
    out: String,
}

impl HclWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `items` separated by blank lines.
    pub fn render(items: &[TopLevel]) -> String {
        let mut writer = Self::new();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                writer.out.push('\n');
            }
            match item {
                TopLevel::Block(block) => writer.write_block(block, 0),
                TopLevel::Comment(lines) => {
                    for line in lines {
                        writer.write_comment(line, 0);
                    }
                }
            }
        }
        writer.out
    }

    /// Render top-level `key = value` assignments, as in a `.tfvars` file.
    pub fn render_assignments(assignments: &[(String, Expr)]) -> String {
        let mut writer = Self::new();
        let body: Vec<BodyItem> = assignments
            .iter()
            .map(|(k, v)| BodyItem::Attr(k.clone(), v.clone()))
            .collect();
        writer.write_body(&body, 0);
        writer.out
    }

    fn indent(&mut self, depth: usize) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }

    fn write_comment(&mut self, text: &str, depth: usize) {
        for line in comment_text_lines(text) {
            self.indent(depth);
            if line.is_empty() {
                self.out.push_str("#\n");
            } else {
                let _ = writeln!(self.out, "# {line}");
            }
        }
    }

    fn write_block(&mut self, block: &Block, depth: usize) {
        self.indent(depth);
        self.out.push_str(&block.kind);
        for label in &block.labels {
            let _ = write!(self.out, " {}", quote(label, true));
        }

        if block.body.is_empty() {
            self.out.push_str(" {}\n");
            return;
        }

        self.out.push_str(" {\n");
        self.write_body(&block.body, depth + 1);
        self.indent(depth);
        self.out.push_str("}\n");
    }

    fn write_body(&mut self, body: &[BodyItem], depth: usize) {
        let mut i = 0;
        while i < body.len() {
            match &body[i] {
                BodyItem::Attr(..) => {
                    // Align the run of consecutive single-line attributes.
                    let run_end = body[i..]
                        .iter()
                        .position(|item| !matches!(item, BodyItem::Attr(_, v) if !v.is_multiline()))
                        .map_or(body.len(), |p| i + p);

                    if run_end == i {
                        if let BodyItem::Attr(key, value) = &body[i] {
                            self.write_attr(key, value, key_width(key), depth);
                        }
                        i += 1;
                        continue;
                    }

                    let width = body[i..run_end]
                        .iter()
                        .filter_map(|item| match item {
                            BodyItem::Attr(key, _) => Some(key_width(key)),
                            _ => None,
                        })
                        .max()
                        .unwrap_or(0);

                    for item in &body[i..run_end] {
                        if let BodyItem::Attr(key, value) = item {
                            self.write_attr(key, value, width, depth);
                        }
                    }
                    i = run_end;
                }
                BodyItem::Block(block) => {
                    if i > 0 && !matches!(body[i - 1], BodyItem::Blank | BodyItem::Comment(_)) {
                        self.out.push('\n');
                    }
                    self.write_block(block, depth);
                    i += 1;
                }
                BodyItem::Comment(text) => {
                    self.write_comment(text, depth);
                    i += 1;
                }
                BodyItem::Blank => {
                    self.out.push('\n');
                    i += 1;
                }
            }
        }
    }

    fn write_attr(&mut self, key: &str, value: &Expr, width: usize, depth: usize) {
        self.indent(depth);
        let key = object_key(key);
        let _ = write!(self.out, "{key:<width$} = ");
        self.write_expr(value, depth);
        self.out.push('\n');
    }

    fn write_expr(&mut self, expr: &Expr, depth: usize) {
        match expr {
            Expr::Str(s) => self.out.push_str(&quote(s, true)),
            Expr::Template(s) => self.out.push_str(&quote(s, false)),
            Expr::Raw(s) => self.out.push_str(s),
            Expr::Int(n) => {
                let _ = write!(self.out, "{n}");
            }
            Expr::Bool(b) => {
                let _ = write!(self.out, "{b}");
            }
            Expr::List(items) if items.is_empty() => self.out.push_str("[]"),
            Expr::List(items) if !expr.is_multiline() => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.write_expr(item, depth);
                }
                self.out.push(']');
            }
            Expr::List(items) => {
                self.out.push_str("[\n");
                for item in items {
                    self.indent(depth + 1);
                    self.write_expr(item, depth + 1);
                    self.out.push_str(",\n");
                }
                self.indent(depth);
                self.out.push(']');
            }
            Expr::Object(entries) if entries.is_empty() => self.out.push_str("{}"),
            Expr::Object(entries) => {
                self.out.push_str("{\n");
                let width = entries.iter().map(|(k, _)| key_width(k)).max().unwrap_or(0);
                for (key, value) in entries {
                    self.write_attr(key, value, width, depth + 1);
                }
                self.indent(depth);
                self.out.push('}');
            }
        }
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key, true)
    }
}

fn key_width(key: &str) -> usize {
    object_key(key).chars().count()
}

/// Quote a string literal. With `literal` set, template sequences are escaped.
fn quote(value: &str, literal: bool) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if literal && chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_aligned_resource_block() {
        let block = Block::resource("aws_instance", "api")
            .attr("ami", Expr::raw("data.aws_ami.ubuntu.id"))
            .attr("instance_type", "t3.micro")
            .block(
                Block::new("tags")
                    .attr("Name", Expr::template("${var.project_name}-api")),
            );

        let text = HclWriter::render(&[TopLevel::Block(block)]);
        assert_eq!(
            text,
            "resource \"aws_instance\" \"api\" {\n  \
             ami           = data.aws_ami.ubuntu.id\n  \
             instance_type = \"t3.micro\"\n\n  \
             tags {\n    \
             Name = \"${var.project_name}-api\"\n  \
             }\n\
             }\n"
        );
    }

    #[test]
    fn literal_strings_escape_interpolation() {
        assert_eq!(quote("cost ${x} \"y\"", true), "\"cost $${x} \\\"y\\\"\"");
        assert_eq!(quote("${var.a}", false), "\"${var.a}\"");
    }

    #[test]
    fn objects_quote_only_non_identifier_keys() {
        // HCL identifiers may contain dashes; slashes need quoting.
        let block = Block::new("locals").attr(
            "tags",
            Expr::Object(vec![
                ("Project".into(), Expr::var("project_name")),
                ("cost-center".into(), Expr::str("eng")),
                ("a/b".into(), Expr::str("x")),
            ]),
        );
        let text = HclWriter::render(&[TopLevel::Block(block)]);
        assert!(text.contains("tags = {\n"));
        assert!(text.contains("    Project     = var.project_name\n"));
        assert!(text.contains("    cost-center = \"eng\"\n"));
        assert!(text.contains("    \"a/b\"       = \"x\"\n"));
    }

    #[test]
    fn multiline_comment_text_is_commented_per_line() {
        let text = HclWriter::render(&[TopLevel::Comment(vec!["Web\nServer (compute)".into()])]);
        assert_eq!(text, "# Web\n# Server (compute)\n");

        let block = Block::new("locals").comment("a\nb");
        let text = HclWriter::render(&[TopLevel::Block(block)]);
        assert_eq!(text, "locals {\n  # a\n  # b\n}\n");
    }

    #[test]
    fn empty_block_is_inline() {
        let text = HclWriter::render(&[TopLevel::Block(Block::new("features"))]);
        assert_eq!(text, "features {}\n");
    }

    #[test]
    fn comments_and_blocks_are_separated() {
        let text = HclWriter::render(&[
            TopLevel::Comment(vec!["header".into(), String::new()]),
            TopLevel::Block(Block::new("terraform")),
        ]);
        assert_eq!(text, "# header\n#\n\nterraform {}\n");
    }

    #[test]
    fn assignments_are_aligned() {
        let text = HclWriter::render_assignments(&[
            ("region".into(), Expr::str("us-east-1")),
            ("db_password".into(), Expr::str("secret")),
        ]);
        assert_eq!(text, "region      = \"us-east-1\"\ndb_password = \"secret\"\n");
    }

    #[test]
    fn addresses() {
        assert_eq!(Block::resource("aws_vpc", "main").address(), "aws_vpc.main");
        assert_eq!(Block::data("aws_ami", "ubuntu").address(), "data.aws_ami.ubuntu");
    }
}
