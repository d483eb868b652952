/*!
 * Payload extraction from a structured model response
 *
 * The response document carries an optional JSON metadata block introduced
 * by a `===META===` marker line and an optional XML operations block
 * introduced by `===XML===`. The scanner is a tolerant single pass: JSON
 * capture starts at the first line containing `{` and ends when brace depth
 * returns to zero; everything after the XML marker belongs to the payload.
 */

use std::io::BufRead;

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use serde_json::Value;

use crate::error::Result;
use crate::ops::{FileOperation, OpKind};

static META_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*===META===\s*$").unwrap());
static XML_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*===XML===\s*$").unwrap());

/// Raw payload blocks located in a response document
#[derive(Debug, Clone, Default)]
pub struct Payload {
    /// JSON metadata block, if one was captured
    pub meta_json: Option<String>,
    /// XML operations block, if one was captured
    pub ops_xml: Option<String>,
}

/// Scan a document line by line and extract the payload blocks
///
/// The first complete JSON block wins; later `===META===` markers are
/// ignored. Brace counting is textual and does not account for braces
/// inside string literals, matching the tolerant-scanner contract.
pub fn extract_payload<R: BufRead>(reader: R) -> Result<Payload> {
    let mut in_meta = false;
    let mut in_xml = false;
    let mut collecting_json = false;
    let mut json_done = false;
    let mut depth: i64 = 0;

    let mut json_lines: Vec<String> = Vec::new();
    let mut xml_lines: Vec<String> = Vec::new();

    for line in reader.lines() {
        let line = line?;

        if XML_MARKER.is_match(&line) {
            in_xml = true;
            in_meta = false;
            continue;
        }

        if META_MARKER.is_match(&line) {
            if !json_done {
                in_meta = true;
            }
            continue;
        }

        if in_xml {
            xml_lines.push(line);
            continue;
        }

        if in_meta {
            let trimmed = line.trim();
            if !collecting_json && trimmed.contains('{') {
                collecting_json = true;
            }
            if collecting_json {
                depth += trimmed.matches('{').count() as i64;
                depth -= trimmed.matches('}').count() as i64;
                json_lines.push(line);
                if depth <= 0 {
                    collecting_json = false;
                    in_meta = false;
                    json_done = true;
                }
            }
        }
    }

    Ok(Payload {
        meta_json: json_done.then(|| json_lines.join("\n")),
        ops_xml: (!xml_lines.is_empty()).then(|| xml_lines.join("\n")),
    })
}

/// Decode the JSON metadata block
pub fn parse_meta(json: &str) -> Result<Value> {
    Ok(serde_json::from_str(json)?)
}

/// Render decoded metadata as an indented key/value outline
pub fn render_meta(value: &Value) -> String {
    let mut out = String::new();
    render_value(value, 0, &mut out);
    out
}

fn render_value(value: &Value, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                out.push_str(&format!("{}{}:\n", pad, key));
                render_value(child, indent + 1, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                out.push_str(&format!("{}[{}]:\n", pad, index));
                render_value(child, indent + 1, out);
            }
        }
        Value::String(s) => out.push_str(&format!("{}{}\n", pad, s)),
        other => out.push_str(&format!("{}{}\n", pad, other)),
    }
}

/// Child element of `<file>` currently being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Summary,
    Content,
}

#[derive(Debug, Default)]
struct PendingOp {
    operation: String,
    path: String,
    language: Option<String>,
    change_summary: Option<String>,
    content: Option<String>,
}

impl PendingOp {
    fn from_attributes(element: &BytesStart) -> Result<Self> {
        let mut pending = Self::default();

        for attribute in element.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            let value = attribute
                .unescape_value()
                .map_err(quick_xml::Error::from)?
                .into_owned();
            match attribute.key.as_ref() {
                b"operation" => pending.operation = value,
                b"path" => pending.path = value,
                b"language" => pending.language = Some(value),
                _ => {}
            }
        }

        Ok(pending)
    }

    fn append(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Summary => self.change_summary.get_or_insert_with(String::new),
            Field::Content => self.content.get_or_insert_with(String::new),
        };
        target.push_str(text);
    }

    /// Finish the record, dropping it with a warning when it cannot be applied
    fn finish(self) -> Option<FileOperation> {
        if self.path.is_empty() {
            eprintln!("Warning: dropping operation record without a path");
            return None;
        }

        let kind: OpKind = match self.operation.parse() {
            Ok(kind) => kind,
            Err(_) => {
                eprintln!(
                    "Warning: dropping record for {}: unknown operation {:?}",
                    self.path, self.operation
                );
                return None;
            }
        };

        Some(FileOperation {
            kind,
            path: self.path,
            language: self.language,
            change_summary: self.change_summary.map(|s| s.trim().to_string()),
            content: self.content,
        })
    }
}

/// Decode the XML operations block into file operation records
///
/// Expected shape:
/// `<files><file operation="create" language="rust" path="src/new.rs">
/// <change_summary>...</change_summary><content>...</content></file></files>`
pub fn parse_operations(xml: &str) -> Result<Vec<FileOperation>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut operations = Vec::new();
    let mut current: Option<PendingOp> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"file" => current = Some(PendingOp::from_attributes(&e)?),
                b"change_summary" if current.is_some() => field = Some(Field::Summary),
                b"content" if current.is_some() => field = Some(Field::Content),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"file" => {
                if let Some(op) = PendingOp::from_attributes(&e)?.finish() {
                    operations.push(op);
                }
            }
            Ok(Event::Text(t)) => {
                if let (Some(pending), Some(field)) = (current.as_mut(), field) {
                    pending.append(field, &t.unescape()?);
                }
            }
            Ok(Event::CData(t)) => {
                if let (Some(pending), Some(field)) = (current.as_mut(), field) {
                    pending.append(field, &String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"change_summary" | b"content" => field = None,
                b"file" => {
                    if let Some(op) = current.take().and_then(PendingOp::finish) {
                        operations.push(op);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_marker_lines_tolerate_whitespace() {
        assert!(META_MARKER.is_match("===META==="));
        assert!(META_MARKER.is_match("  ===META===  "));
        assert!(!META_MARKER.is_match("===META=== trailing"));
        assert!(XML_MARKER.is_match("\t===XML==="));
    }

    #[test]
    fn test_extract_multiline_json_block() {
        let doc = "prose before\n===META===\nsome note\n{\n  \"a\": {\n    \"b\": 1\n  }\n}\ntrailing prose\n";
        let payload = extract_payload(Cursor::new(doc)).unwrap();

        let json = payload.meta_json.unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(parse_meta(&json).is_ok());
        assert!(payload.ops_xml.is_none());
    }

    #[test]
    fn test_first_json_block_wins() {
        let doc = "===META===\n{ \"first\": 1 }\n===META===\n{ \"second\": 2 }\n";
        let payload = extract_payload(Cursor::new(doc)).unwrap();
        assert_eq!(payload.meta_json.unwrap(), "{ \"first\": 1 }");
    }

    #[test]
    fn test_xml_runs_to_end_of_input() {
        let doc = "===XML===\n<files>\n<file operation=\"delete\" path=\"a\"/>\n</files>\n";
        let payload = extract_payload(Cursor::new(doc)).unwrap();
        let xml = payload.ops_xml.unwrap();
        assert!(xml.contains("<files>"));
        assert!(xml.contains("</files>"));
    }

    #[test]
    fn test_document_without_markers() {
        let payload = extract_payload(Cursor::new("just prose\nno markers\n")).unwrap();
        assert!(payload.meta_json.is_none());
        assert!(payload.ops_xml.is_none());
    }

    #[test]
    fn test_render_meta_outline() {
        let value: Value =
            serde_json::from_str(r#"{"name": "demo", "items": [1, "two"], "count": 3}"#).unwrap();
        let rendered = render_meta(&value);

        assert!(rendered.contains("name:\n  demo\n"));
        assert!(rendered.contains("items:\n  [0]:\n    1\n  [1]:\n    two\n"));
        assert!(rendered.contains("count:\n  3\n"));
    }

    #[test]
    fn test_parse_operations() {
        let xml = r#"<files>
<file operation="create" language="rust" path="src/new.rs">
<change_summary>Add a new module</change_summary>
<content>pub fn hello() {}</content>
</file>
<file operation="DELETE" path="old.txt">
<change_summary>Remove obsolete notes</change_summary>
</file>
</files>"#;

        let ops = parse_operations(xml).unwrap();
        assert_eq!(ops.len(), 2);

        assert_eq!(ops[0].kind, OpKind::Create);
        assert_eq!(ops[0].path, "src/new.rs");
        assert_eq!(ops[0].language.as_deref(), Some("rust"));
        assert_eq!(ops[0].change_summary.as_deref(), Some("Add a new module"));
        assert!(ops[0].content.as_deref().unwrap().contains("pub fn hello()"));

        assert_eq!(ops[1].kind, OpKind::Delete);
        assert_eq!(ops[1].path, "old.txt");
        assert!(ops[1].content.is_none());
    }

    #[test]
    fn test_parse_operations_drops_unknown_kind() {
        let xml = r#"<files>
<file operation="rename" path="a.txt"><change_summary>move</change_summary></file>
<file operation="update" path="b.txt"><content>x</content></file>
</files>"#;

        let ops = parse_operations(xml).unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].kind, OpKind::Update);
        assert_eq!(ops[0].path, "b.txt");
    }

    #[test]
    fn test_parse_operations_escaped_content() {
        let xml = r#"<files>
<file operation="create" path="cmp.rs"><content>if a &lt; b &amp;&amp; b &gt; 0 {}</content></file>
</files>"#;

        let ops = parse_operations(xml).unwrap();
        assert_eq!(ops[0].content.as_deref(), Some("if a < b && b > 0 {}"));
    }
}
