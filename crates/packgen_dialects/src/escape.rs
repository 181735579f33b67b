//! Value escaping for each dialect's string literals.

use std::fmt::Write;

use packgen_templates::Escaper;

/// Escapes values for single- or double-quoted Python string literals.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonEscaper;

impl Escaper for PythonEscaper {
    fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {
                    let _ = write!(out, "\\x{:02x}", c as u32);
                }
                c => out.push(c),
            }
        }
        out
    }

    fn quote(&self, value: &str) -> String {
        format!("'{}'", self.escape(value))
    }
}

/// Escapes values for JSON strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEscaper;

impl Escaper for JsonEscaper {
    fn escape(&self, value: &str) -> String {
        let quoted = self.quote(value);
        quoted[1..quoted.len() - 1].to_string()
    }

    fn quote(&self, value: &str) -> String {
        serde_json::Value::String(value.to_string()).to_string()
    }
}

/// Escapes values for TOML basic (double-quoted) strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlEscaper;

impl Escaper for TomlEscaper {
    fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{8}' => out.push_str("\\b"),
                '\u{c}' => out.push_str("\\f"),
                c if c.is_control() => {
                    let _ = write!(out, "\\u{:04X}", c as u32);
                }
                c => out.push(c),
            }
        }
        out
    }

    fn quote(&self, value: &str) -> String {
        format!("\"{}\"", self.escape(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_escape() {
        let e = PythonEscaper;
        assert_eq!(e.escape(r"a'b"), r"a\'b");
        assert_eq!(e.escape("a\"b"), "a\\\"b");
        assert_eq!(e.escape("back\\slash"), "back\\\\slash");
        assert_eq!(e.escape("line\nbreak"), "line\\nbreak");
        assert_eq!(e.escape("\u{1}"), "\\x01");
        assert_eq!(e.quote("py.typed"), "'py.typed'");
    }

    #[test]
    fn test_json_escape() {
        let e = JsonEscaper;
        assert_eq!(e.escape("a\"b"), "a\\\"b");
        assert_eq!(e.escape("tab\there"), "tab\\there");
        assert_eq!(e.quote("*.js"), "\"*.js\"");
        assert_eq!(e.escape(""), "");
    }

    #[test]
    fn test_toml_escape() {
        let e = TomlEscaper;
        assert_eq!(e.escape("a\"b"), "a\\\"b");
        assert_eq!(e.escape("c:\\path"), "c:\\\\path");
        assert_eq!(e.escape("\u{7f}"), "\\u007F");
        assert_eq!(e.quote("src/**/*.rs"), "\"src/**/*.rs\"");
    }

    #[test]
    fn test_escaped_values_round_trip_through_parsers() {
        let nasty = "quote\" apostrophe' back\\slash\nnewline";

        let json = format!("{{\"v\": \"{}\"}}", JsonEscaper.escape(nasty));
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["v"], nasty);

        let toml_text = format!("v = \"{}\"", TomlEscaper.escape(nasty));
        let parsed: toml::Table = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed["v"].as_str(), Some(nasty));
    }
}
