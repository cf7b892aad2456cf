//! CLI output formatting: highlighted JSON and table cell helpers.

use std::fmt::Write;

use colored::Colorize;
use serde_json::Value;

const INDENT: &str = "  ";

/// Prints JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, booleans and null magenta.
pub fn print_highlighted_json(value: &Value) {
    println!("{}", highlight_json(value));
}

/// Renders `value` the way `serde_json::to_string_pretty` does, with colors.
#[must_use]
pub fn highlight_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => push(out, "null".magenta()),
        Value::Bool(b) => push(out, b.to_string().magenta()),
        Value::Number(n) => push(out, n.to_string().yellow()),
        Value::String(s) => push(out, quote(s).green()),
        Value::Array(items) => {
            if items.is_empty() {
                push(out, "[]".white().bold());
                return;
            }
            push(out, "[".white().bold());
            for (i, item) in items.iter().enumerate() {
                newline(out, depth + 1);
                write_value(out, item, depth + 1);
                if i + 1 < items.len() {
                    push(out, ",".white());
                }
            }
            newline(out, depth);
            push(out, "]".white().bold());
        }
        Value::Object(map) => {
            if map.is_empty() {
                push(out, "{}".white().bold());
                return;
            }
            push(out, "{".white().bold());
            for (i, (key, item)) in map.iter().enumerate() {
                newline(out, depth + 1);
                push(out, quote(key).cyan());
                push(out, ": ".white());
                write_value(out, item, depth + 1);
                if i + 1 < map.len() {
                    push(out, ",".white());
                }
            }
            newline(out, depth);
            push(out, "}".white().bold());
        }
    }
}

fn push(out: &mut String, token: colored::ColoredString) {
    let _ = write!(out, "{token}");
}

fn newline(out: &mut String, depth: usize) {
    out.push('\n');
    out.push_str(&INDENT.repeat(depth));
}

fn quote(s: &str) -> String { serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\"")) }

/// Truncates a string to a maximum number of characters, adding an ellipsis.
///
/// Counts characters, not bytes.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 1 {
        return "…".to_string();
    }

    let kept: String = s.chars().take(max_chars - 1).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check mark or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Formats an optional table cell, using a dash when absent.
#[must_use]
pub fn format_optional(value: Option<&str>) -> String {
    value.map_or_else(|| "-".dimmed().to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn plain(value: &Value) -> String {
        colored::control::set_override(false);
        highlight_json(value)
    }

    #[test]
    fn test_highlight_matches_pretty_layout() {
        let value = json!({
            "jsonrpc": "2.0",
            "result": { "windows": [ { "id": 1, "name": "Terminal" } ], "ghost_slots": [] },
            "id": 7,
            "extra": null,
            "ok": true,
            "meta": {}
        });
        assert_eq!(plain(&value), serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_highlight_escapes_strings() {
        let value = json!({ "text": "line\n\"quoted\"" });
        assert_eq!(plain(&value), serde_json::to_string_pretty(&value).unwrap());
    }

    #[test]
    fn test_highlight_scalar() {
        assert_eq!(plain(&json!(-32601)), "-32601");
        assert_eq!(plain(&json!("x")), "\"x\"");
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello w…");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_min_length() {
        assert_eq!(truncate("hello", 1), "…");
    }

    #[test]
    fn test_truncate_multibyte_utf8() {
        let s = "naïve café window";
        assert_eq!(truncate(s, 8), "naïve c…");
        assert_eq!(truncate(s, 30), s);
    }

    #[test]
    fn test_format_bool() {
        assert!(format_bool(true).contains('✓'));
        assert!(format_bool(false).contains('✗'));
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some("left")), "left");
        assert!(format_optional(None).contains('-'));
    }
}
