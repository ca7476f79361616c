//! Failure diagnostics and terminal colours

use crate::runtime::{Realm, Value};
use std::fmt;

/// Symbolic terminal colours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Bold,
    Gray,
    Reset,
}

impl Color {
    /// ANSI escape sequence
    pub fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Bold => "\x1b[1m",
            Color::Gray => "\x1b[90m",
            Color::Reset => "\x1b[0m",
        }
    }

    /// Look up a colour by its symbolic name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "yellow" => Some(Color::Yellow),
            "bold" => Some(Color::Bold),
            "gray" => Some(Color::Gray),
            "reset" => Some(Color::Reset),
            _ => None,
        }
    }
}

/// Resolves colours to escape codes, or to nothing when colour is off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn get(&self, color: Color) -> &'static str {
        if self.enabled {
            color.code()
        } else {
            ""
        }
    }
}

/// Where an assertion was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    pub file: String,
    pub line: u32,
}

impl SourcePosition {
    /// Position of the innermost script frame on the realm's stack
    pub fn current(realm: &Realm) -> Self {
        let trace = realm.capture_stack(1);
        match trace.top() {
            Some(frame) => {
                let file = frame
                    .script_id
                    .and_then(|id| realm.modules().lookup(id).ok())
                    .map(|meta| meta.url.clone())
                    .unwrap_or_else(|| "<unknown>".to_string());
                Self {
                    file,
                    line: frame.line,
                }
            }
            None => Self {
                file: "<native>".to_string(),
                line: 0,
            },
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Render a value for a diagnostic: objects as JSON, primitives in their
/// default string form
pub fn stringify_for_output(value: &Value) -> String {
    if value.is_object() {
        match value.json_stringify() {
            Ok(Some(json)) => json,
            Ok(None) | Err(_) => value.to_js_string(),
        }
    } else {
        value.to_js_string()
    }
}

/// Render the three-line Expected / Received / at block
pub fn format_failure(
    palette: &Palette,
    expected: &str,
    received: &str,
    position: &SourcePosition,
) -> String {
    let red = palette.get(Color::Red);
    let yellow = palette.get(Color::Yellow);
    let bold = palette.get(Color::Bold);
    let gray = palette.get(Color::Gray);
    let reset = palette.get(Color::Reset);

    format!(
        "{red}{bold}Expected: {reset}{red}{expected}{reset}\n\
         {yellow}{bold}Received: {reset}{yellow}{received}{reset}\n   \
         at {gray}{position}{reset}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn position() -> SourcePosition {
        SourcePosition {
            file: "/p/a.test.js".to_string(),
            line: 12,
        }
    }

    #[test]
    fn test_plain_block() {
        let text = format_failure(&Palette::new(false), "5", "6", &position());
        assert_eq!(text, "Expected: 5\nReceived: 6\n   at /p/a.test.js:12\n");
    }

    #[test]
    fn test_coloured_block() {
        let text = format_failure(&Palette::new(true), "[Not] true", "true", &position());
        assert_eq!(
            text,
            "\x1b[31m\x1b[1mExpected: \x1b[0m\x1b[31m[Not] true\x1b[0m\n\
             \x1b[33m\x1b[1mReceived: \x1b[0m\x1b[33mtrue\x1b[0m\n   \
             at \x1b[90m/p/a.test.js:12\x1b[0m\n"
        );
    }

    #[test]
    fn test_stringify_for_output() {
        assert_eq!(stringify_for_output(&Value::from("abc")), "abc");
        assert_eq!(stringify_for_output(&Value::from(3)), "3");
        assert_eq!(stringify_for_output(&Value::Undefined), "undefined");
        let obj = Value::new_object_from([("a", Value::from(1))]);
        assert_eq!(stringify_for_output(&obj), r#"{"a":1}"#);
        let arr = Value::new_array(vec![1.into(), "x".into()]);
        assert_eq!(stringify_for_output(&arr), r#"[1,"x"]"#);
    }

    #[test]
    fn test_numbers_match_json_form() {
        assert_eq!(stringify_for_output(&Value::Number(1e21)), "1e+21");
        assert_eq!(stringify_for_output(&Value::Number(1e-7)), "1e-7");
        let arr = Value::new_array(vec![Value::Number(1e21), Value::Number(1e-7)]);
        assert_eq!(stringify_for_output(&arr), "[1e+21,1e-7]");
    }

    #[test]
    fn test_stringify_cycle_falls_back() {
        let obj = Value::new_object();
        obj.set_property("me", obj.clone());
        assert_eq!(stringify_for_output(&obj), "[object Object]");
    }

    #[test]
    fn test_color_names() {
        assert_eq!(Color::from_name("gray"), Some(Color::Gray));
        assert_eq!(Color::from_name("purple"), None);
        assert_eq!(Palette::new(false).get(Color::Red), "");
    }

    #[test]
    fn test_position_without_frames() {
        let realm = Realm::new();
        assert_eq!(SourcePosition::current(&realm).to_string(), "<native>:0");
    }
}
