//! Indented pretty-printer for nested values of unknown shape.
//!
//! ```text
//! {
//!   a:
//!     [
//!       1
//!       2
//!     ]
//! }
//! ```

use std::io::{self, Write};

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Key/value pairs in insertion order
    Map(Vec<(String, Value)>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Leaf, already rendered as text
    Scalar(String),
}

impl Value {
    pub fn scalar(value: impl ToString) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::String(s) => Value::Scalar(s),
            other => Value::Scalar(other.to_string()),
        }
    }
}

fn write_line<W: Write>(out: &mut W, depth: usize, text: &str) -> io::Result<()> {
    writeln!(out, "{}{}", INDENT.repeat(depth), text)
}

fn write_sequence<W: Write>(
    out: &mut W,
    items: &[Value],
    depth: usize,
    open: &str,
    close: &str,
) -> io::Result<()> {
    write_line(out, depth, open)?;
    for item in items {
        write_dump(out, item, depth + 1)?;
    }
    write_line(out, depth, close)
}

/// Writes `value` depth-first, one line per bracket, key or leaf.
pub fn write_dump<W: Write>(out: &mut W, value: &Value, depth: usize) -> io::Result<()> {
    match value {
        Value::Map(entries) => {
            write_line(out, depth, "{")?;
            for (key, val) in entries {
                match val {
                    Value::Scalar(text) => write_line(out, depth + 1, &format!("{key}: {text}"))?,
                    nested => {
                        write_line(out, depth + 1, &format!("{key}: "))?;
                        write_dump(out, nested, depth + 2)?;
                    }
                }
            }
            write_line(out, depth, "}")
        }
        Value::List(items) => write_sequence(out, items, depth, "[", "]"),
        Value::Tuple(items) => write_sequence(out, items, depth, "(", ")"),
        Value::Scalar(text) => write_line(out, depth, text),
    }
}

pub fn dump_to_string(value: &Value) -> String {
    let mut buf = Vec::new();
    write_dump(&mut buf, value, 0).expect("writing to Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Prints `value` to stdout.
pub fn dump(value: &Value) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_dump(&mut lock, value, 0)?;
    lock.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leading_spaces(line: &str) -> usize {
        line.len() - line.trim_start().len()
    }

    #[test]
    fn map_with_nested_list() {
        let value = Value::Map(vec![(
            "a".to_string(),
            Value::List(vec![Value::scalar(1), Value::scalar(2)]),
        )]);
        let out = dump_to_string(&value);
        assert_eq!(out, "{\n  a: \n    [\n      1\n      2\n    ]\n}\n");
    }

    #[test]
    fn indentation_increases_with_depth() {
        let value = Value::Map(vec![(
            "outer".to_string(),
            Value::Map(vec![(
                "inner".to_string(),
                Value::List(vec![Value::scalar("leaf")]),
            )]),
        )]);
        let out = dump_to_string(&value);
        let leaf = out.lines().find(|l| l.trim() == "leaf").unwrap();
        let inner = out.lines().find(|l| l.trim() == "inner:").unwrap();
        let outer = out.lines().find(|l| l.trim() == "outer:").unwrap();
        assert!(leading_spaces(outer) < leading_spaces(inner));
        assert!(leading_spaces(inner) < leading_spaces(leaf));
    }

    #[test]
    fn nested_key_keeps_separator_space() {
        let value = Value::Map(vec![("k".to_string(), Value::Tuple(vec![]))]);
        let out = dump_to_string(&value);
        assert_eq!(out.lines().nth(1), Some("  k: "));
    }

    #[test]
    fn dump_to_stdout_succeeds() {
        let value = Value::Map(vec![(
            "a".to_string(),
            Value::List(vec![Value::scalar(1)]),
        )]);
        assert!(dump(&value).is_ok());
    }

    #[test]
    fn scalar_entries_print_inline() {
        let value = Value::Map(vec![
            ("name".to_string(), Value::scalar("curio")),
            ("count".to_string(), Value::scalar(3)),
        ]);
        assert_eq!(dump_to_string(&value), "{\n  name: curio\n  count: 3\n}\n");
    }

    #[test]
    fn tuple_uses_parentheses() {
        let value = Value::Tuple(vec![Value::scalar("x"), Value::scalar("y")]);
        assert_eq!(dump_to_string(&value), "(\n  x\n  y\n)\n");
    }

    #[test]
    fn bare_scalar() {
        assert_eq!(dump_to_string(&Value::scalar(42)), "42\n");
    }

    #[test]
    fn empty_containers() {
        assert_eq!(dump_to_string(&Value::List(vec![])), "[\n]\n");
        assert_eq!(dump_to_string(&Value::Map(vec![])), "{\n}\n");
    }

    #[test]
    fn from_json_keeps_shape() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a": [1, "two", null, true]}"#).unwrap();
        let value = Value::from(json);
        assert_eq!(
            value,
            Value::Map(vec![(
                "a".to_string(),
                Value::List(vec![
                    Value::scalar(1),
                    Value::scalar("two"),
                    Value::scalar("null"),
                    Value::scalar("true"),
                ]),
            )])
        );
    }
}
