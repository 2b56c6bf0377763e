//! Document formatting
//!
//! Block-style emitter with fixed indent widths, plus the leading
//! indentation captured from the input and re-applied to every output line.

use serde_yaml::Value;

use crate::document::{Chomping, Document, Node, PlainScalar, ScalarStyle, VaultedScalar};
use crate::error::FilterError;

/// Count the spaces leading the first line of the input
pub fn capture_indent(raw: &str) -> usize {
    raw.bytes().take_while(|b| *b == b' ').count()
}

/// Prefix every line of `output` with `indent` spaces
pub fn apply_indent(output: &str, indent: usize) -> String {
    let prefix = " ".repeat(indent);
    let mut result = String::with_capacity(output.len() + indent * 8);
    for line in output.lines() {
        result.push_str(&prefix);
        result.push_str(line);
        result.push('\n');
    }
    result
}

/// Emitter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Write a `---` line before the document
    pub explicit_start: bool,
    /// Columns a nested mapping is indented under its key
    pub mapping_indent: usize,
    /// Columns a sequence item's content is indented under its parent
    pub sequence_indent: usize,
    /// Columns the `-` is indented under its parent
    pub sequence_offset: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            explicit_start: false,
            mapping_indent: 2,
            sequence_indent: 4,
            sequence_offset: 2,
        }
    }
}

/// Serializes a document in block style
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    config: EmitterConfig,
}

impl Emitter {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn emit(&self, document: &Document) -> Result<String, FilterError> {
        let mut out = String::new();
        if self.config.explicit_start {
            out.push_str("---\n");
        }
        match &document.root {
            Node::Mapping(entries) if !entries.is_empty() => {
                self.mapping(&mut out, entries, 0, false)?
            }
            Node::Sequence(items) if !items.is_empty() => {
                self.sequence(&mut out, items, self.config.sequence_offset, false)?
            }
            node => {
                out.push_str(&self.inline(node)?);
                out.push('\n');
            }
        }
        Ok(out)
    }

    /// Column of item content relative to its dash
    fn dash_to_content(&self) -> usize {
        self.config
            .sequence_indent
            .saturating_sub(self.config.sequence_offset)
            .max(2)
    }

    /// Write mapping entries at `column`; the first entry continues the
    /// current line when `continued`
    fn mapping(
        &self,
        out: &mut String,
        entries: &[(Value, Node)],
        column: usize,
        continued: bool,
    ) -> Result<(), FilterError> {
        for (i, (key, value)) in entries.iter().enumerate() {
            if i > 0 || !continued {
                pad(out, column);
            }
            out.push_str(&render_key(key)?);
            out.push(':');
            self.value(
                out,
                value,
                column,
                self.config.mapping_indent,
                self.config.sequence_offset,
            )?;
        }
        Ok(())
    }

    /// Write sequence items with dashes at `column`
    fn sequence(
        &self,
        out: &mut String,
        items: &[Node],
        column: usize,
        continued: bool,
    ) -> Result<(), FilterError> {
        let content = self.dash_to_content();
        for (i, item) in items.iter().enumerate() {
            if i > 0 || !continued {
                pad(out, column);
            }
            out.push('-');
            match item {
                Node::Mapping(entries) if !entries.is_empty() => {
                    pad(out, content - 1);
                    self.mapping(out, entries, column + content, true)?;
                }
                Node::Sequence(inner) if !inner.is_empty() => {
                    pad(out, content - 1);
                    self.sequence(out, inner, column + content, true)?;
                }
                _ => self.value(out, item, column, content, content)?,
            }
        }
        Ok(())
    }

    /// Write the value following a `key:` or `-`, which sits at `column`
    fn value(
        &self,
        out: &mut String,
        node: &Node,
        column: usize,
        block_indent: usize,
        seq_offset: usize,
    ) -> Result<(), FilterError> {
        match node {
            Node::Mapping(entries) if !entries.is_empty() => {
                out.push('\n');
                self.mapping(out, entries, column + block_indent, false)
            }
            Node::Sequence(items) if !items.is_empty() => {
                out.push('\n');
                self.sequence(out, items, column + seq_offset, false)
            }
            Node::Vaulted(vaulted) => {
                block(
                    out,
                    Some(vaulted.tag()),
                    &vaulted.ciphertext,
                    vaulted.chomping,
                    column + block_indent,
                );
                Ok(())
            }
            Node::Plain(PlainScalar {
                text,
                style: ScalarStyle::Literal(chomping),
            }) if literal_safe(text) => {
                block(out, None, text, *chomping, column + block_indent);
                Ok(())
            }
            other => {
                out.push(' ');
                out.push_str(&self.inline(other)?);
                out.push('\n');
                Ok(())
            }
        }
    }

    /// Render a node on a single line
    fn inline(&self, node: &Node) -> Result<String, FilterError> {
        match node {
            Node::Mapping(_) => Ok("{}".to_string()),
            Node::Sequence(_) => Ok("[]".to_string()),
            Node::Plain(plain) => render_string(&plain.text),
            Node::Vaulted(vaulted) => Ok(format!(
                "{} {}",
                vaulted.tag(),
                render_string(&vaulted.ciphertext)?
            )),
            Node::Number(n) => render_scalar(&Value::Number(n.clone())),
            Node::Bool(b) => render_scalar(&Value::Bool(*b)),
            Node::Null => render_scalar(&Value::Null),
            Node::Tagged(tagged) => render_scalar(&Value::Tagged(tagged.clone())),
        }
    }
}

fn pad(out: &mut String, n: usize) {
    out.extend(std::iter::repeat(' ').take(n));
}

/// Write a literal block scalar; content lines start at `indent`
fn block(out: &mut String, tag: Option<&str>, text: &str, chomping: Chomping, indent: usize) {
    out.push(' ');
    if let Some(tag) = tag {
        out.push_str(tag);
        out.push(' ');
    }
    out.push('|');
    out.push_str(chomping.indicator());
    out.push('\n');

    let body = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return;
    }
    for line in body.split('\n') {
        if !line.is_empty() {
            pad(out, indent);
            out.push_str(line);
        }
        out.push('\n');
    }
}

/// Characters YAML reads as line breaks or refuses to carry unescaped
fn needs_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{2028}' | '\u{2029}' | '\u{feff}' | '\u{fffe}' | '\u{ffff}'
        )
}

/// Whether a literal block reproduces `text` exactly
fn literal_safe(text: &str) -> bool {
    let printable = text
        .chars()
        .all(|c| c == '\n' || c == '\t' || !needs_escape(c));
    // Leading whitespace would need an explicit indentation indicator
    let first_content = text.split('\n').find(|line| !line.is_empty());
    let aligned = first_content.map_or(true, |line| !line.starts_with([' ', '\t']));
    printable && aligned
}

fn render_key(key: &Value) -> Result<String, FilterError> {
    match key {
        Value::String(s) => render_string(s),
        other => render_scalar(other),
    }
}

/// Quote a string as needed, falling back to a double-quoted string when
/// the YAML emitter wants more than one line
fn render_string(text: &str) -> Result<String, FilterError> {
    match render_scalar(&Value::String(text.to_string())) {
        Ok(line) => Ok(line),
        Err(_) => double_quoted(text),
    }
}

/// JSON string syntax is YAML double-quoted syntax; JSON leaves line
/// separators and C1 controls raw, so those get `\u` escapes too
fn double_quoted(text: &str) -> Result<String, FilterError> {
    let json = serde_json::to_string(text).map_err(|e| FilterError::Emit(e.to_string()))?;
    let mut quoted = String::with_capacity(json.len());
    for c in json.chars() {
        if needs_escape(c) {
            quoted.push_str(&format!("\\u{:04x}", c as u32));
        } else {
            quoted.push(c);
        }
    }
    Ok(quoted)
}

fn render_scalar(value: &Value) -> Result<String, FilterError> {
    let rendered = serde_yaml::to_string(value).map_err(|e| FilterError::Emit(e.to_string()))?;
    let line = rendered.strip_suffix('\n').unwrap_or(&rendered);
    if line.contains('\n') {
        return Err(FilterError::Emit(format!(
            "value does not fit on one line: {:?}",
            line
        )));
    }
    Ok(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(yaml: &str) -> String {
        Emitter::default().emit(&Document::parse(yaml).unwrap()).unwrap()
    }

    fn reparse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn entry(key: &str, value: PlainScalar) -> (Value, Node) {
        (Value::String(key.into()), Node::Plain(value))
    }

    #[test]
    fn test_capture_indent() {
        assert_eq!(capture_indent("    a: 1\n  b: 2\n"), 4);
        assert_eq!(capture_indent("a: 1\n"), 0);
        assert_eq!(capture_indent("\ta: 1\n"), 0);
        assert_eq!(capture_indent(""), 0);
    }

    #[test]
    fn test_apply_indent() {
        assert_eq!(apply_indent("a:\n\n  b: c\n", 2), "  a:\n  \n    b: c\n");
        assert_eq!(apply_indent("a: 1\n", 0), "a: 1\n");
    }

    #[test]
    fn test_mapping_and_sequence_indents() {
        let out = emit("a: x\nb:\n  c: y\nd:\n- e\n- f: g\n  h: i\n");
        assert_eq!(out, "a: x\nb:\n  c: y\nd:\n  - e\n  - f: g\n    h: i\n");
    }

    #[test]
    fn test_root_sequence_offset() {
        let out = emit("- a\n- - b\n  - c\n");
        assert_eq!(out, "  - a\n  - - b\n    - c\n");
        assert_eq!(reparse(&out), reparse("- a\n- - b\n  - c\n"));
    }

    #[test]
    fn test_key_order_preserved() {
        assert_eq!(emit("z: 1\na: 2\nm: 3\n"), "z: 1\na: 2\nm: 3\n");
    }

    #[test]
    fn test_flow_input_emitted_as_block() {
        let out = emit("a: {b: [x, y], c: {}}\n");
        assert_eq!(out, "a:\n  b:\n    - x\n    - y\n  c: {}\n");
    }

    #[test]
    fn test_quoting_delegated_to_yaml() {
        let out = emit("a: 'true'\nb: 'x: y'\n'': ''\n");
        assert_eq!(reparse(&out), reparse("a: 'true'\nb: 'x: y'\n'': ''\n"));
    }

    #[test]
    fn test_literal_chomping() {
        let doc = Document {
            root: Node::Mapping(vec![
                entry("keep", PlainScalar::literal("hello\n\n")),
                entry("clip", PlainScalar::literal("hello\n")),
                entry("strip", PlainScalar::literal("a\nhello")),
            ]),
        };
        let out = Emitter::default().emit(&doc).unwrap();
        assert_eq!(
            out,
            "keep: |+\n  hello\n\nclip: |\n  hello\nstrip: |-\n  a\n  hello\n"
        );

        let value = reparse(&out);
        assert_eq!(value["keep"], Value::String("hello\n\n".into()));
        assert_eq!(value["clip"], Value::String("hello\n".into()));
        assert_eq!(value["strip"], Value::String("a\nhello".into()));
    }

    #[test]
    fn test_vault_block_in_sequence() {
        let doc = Document {
            root: Node::Sequence(vec![Node::Vaulted(VaultedScalar::new(
                "$ANSIBLE_VAULT;1.1;AES256\n6162\n",
            ))]),
        };
        let out = Emitter::default().emit(&doc).unwrap();
        assert_eq!(out, "  - !vault |\n    $ANSIBLE_VAULT;1.1;AES256\n    6162\n");

        let reparsed = Document::parse(&out).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_unsafe_literal_falls_back_to_quotes() {
        let doc = Document {
            root: Node::Mapping(vec![
                entry("indented", PlainScalar::literal("  lead\nline\n")),
                entry("control", PlainScalar::literal("a\u{7}\nb\n")),
            ]),
        };
        let out = Emitter::default().emit(&doc).unwrap();
        let value = reparse(&out);
        assert_eq!(value["indented"], Value::String("  lead\nline\n".into()));
        assert_eq!(value["control"], Value::String("a\u{7}\nb\n".into()));
    }

    #[test]
    fn test_line_separators_are_quoted() {
        let texts = [
            "x\u{2029}x\ny\n",
            "a\u{2028}b\n",
            "nel\u{85}\nline\n",
            "del\u{7f}\nline\n",
        ];
        let doc = Document {
            root: Node::Sequence(
                texts
                    .iter()
                    .map(|t| Node::Plain(PlainScalar::literal(*t)))
                    .collect(),
            ),
        };
        let out = Emitter::default().emit(&doc).unwrap();
        assert!(!out.contains('|'));
        assert!(!out.contains(['\u{2028}', '\u{2029}', '\u{85}', '\u{7f}']));

        let expected = texts.iter().map(|t| Value::String(t.to_string()));
        assert_eq!(reparse(&out), Value::Sequence(expected.collect()));
    }

    #[test]
    fn test_explicit_start() {
        let config = EmitterConfig {
            explicit_start: true,
            ..EmitterConfig::default()
        };
        let out = Emitter::new(config)
            .emit(&Document::parse("a: b\n").unwrap())
            .unwrap();
        assert_eq!(out, "---\na: b\n");
    }

    #[test]
    fn test_indented_output_reparses_equal() {
        let out = emit("a:\n- b: |\n    x\n    y\n  c: d\n");
        let shifted = apply_indent(&out, 4);
        assert!(shifted.lines().all(|l| l.starts_with("    ")));
        assert_eq!(reparse(&shifted), reparse(&out));
    }
}
