use std::fmt::Write;

use crate::value::{Assignment, Document, Value};

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

struct XmlWriter {
    buf: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        XmlWriter {
            buf: String::new(),
            depth: 0,
        }
    }

    /// Start a new line at the current indentation (2 spaces per level).
    fn line(&mut self) {
        if !self.buf.is_empty() {
            self.buf.push('\n');
        }
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }

    fn write_document(&mut self, doc: &Document) {
        self.buf.push_str(DECLARATION);
        self.line();
        self.buf.push_str("<configuration>");
        self.depth += 1;
        for assignment in doc.iter() {
            self.write_assignment(assignment);
        }
        self.depth -= 1;
        self.line();
        self.buf.push_str("</configuration>");
    }

    fn write_assignment(&mut self, assignment: &Assignment) {
        self.line();
        self.buf.push_str("<assignment name=\"");
        self.write_escaped(&assignment.name);
        self.buf.push_str("\">");
        self.depth += 1;
        self.write_value(&assignment.value);
        self.depth -= 1;
        self.line();
        self.buf.push_str("</assignment>");
    }

    fn write_value(&mut self, value: &Value) {
        self.line();
        match value {
            Value::Integer(n) => {
                // Writing to a String cannot fail.
                let _ = write!(&mut self.buf, "<number>{}</number>", n);
            }
            Value::Float(f) => {
                self.buf.push_str("<number>");
                self.buf.push_str(&format_float(*f));
                self.buf.push_str("</number>");
            }
            Value::Text(s) => {
                self.buf.push_str("<string>");
                self.write_escaped(s);
                self.buf.push_str("</string>");
            }
            Value::Array(items) => {
                self.buf.push_str("<array>");
                self.depth += 1;
                for item in items {
                    self.write_value(item);
                }
                self.depth -= 1;
                self.line();
                self.buf.push_str("</array>");
            }
        }
    }

    fn write_escaped(&mut self, s: &str) {
        for ch in s.chars() {
            match ch {
                '&' => self.buf.push_str("&amp;"),
                '<' => self.buf.push_str("&lt;"),
                '>' => self.buf.push_str("&gt;"),
                '"' => self.buf.push_str("&quot;"),
                '\'' => self.buf.push_str("&apos;"),
                c => self.buf.push(c),
            }
        }
    }
}

/// Native float formatting, keeping a trailing `.0` on integral values so
/// floats stay distinguishable from integers in the output.
pub fn format_float(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains(['.', 'e', 'E']) {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Render a document as an XML `<configuration>` element.
pub fn to_xml(doc: &Document) -> String {
    let mut w = XmlWriter::new();
    w.write_document(doc);
    w.buf
}
