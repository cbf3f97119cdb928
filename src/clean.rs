//! Parameter cleaning.
//!
//! Raw values coming from forms or plan builders are coerced into the
//! canonical shape of a [`ValueKind`]. Cleaning never fails by itself: it
//! strips or coerces. Callers detect invalid input by comparing the cleaned
//! value against the original with [`loose_eq`].

use std::sync::LazyLock;

use regex::Regex;

use crate::core::{Value, ValueKind};

static FILE_ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[[:cntrl:]&<>"`|':\\/]"#).unwrap());

static PATH_ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[[:cntrl:]&<>"`|':]"#).unwrap());

static PATH_DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.\.+").unwrap());

static PATH_SLASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"//+").unwrap());

static PATH_DOT_SEGMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/(\./)+").unwrap());

static ALPHAEXT_ILLEGAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_\-]").unwrap());

static INTEGER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?)(\d+)").unwrap());

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").unwrap()
});

/// Cleans `value` into the canonical representation for `kind`.
///
/// * booleans become [`Value::Bool`]
/// * integers become [`Value::Int`]
/// * filenames and paths become [`Value::Text`]
pub fn clean(value: &Value, kind: ValueKind) -> Value {
    match kind {
        ValueKind::Boolean => Value::Bool(clean_bool(value)),
        ValueKind::Integer => Value::Int(clean_int(value)),
        ValueKind::Filename => Value::Text(clean_filename(&value.to_text())),
        ValueKind::Path => Value::Text(clean_path(&value.to_text())),
    }
}

fn clean_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(int) => *int != 0,
        Value::Text(text) => match text.to_lowercase().as_str() {
            "on" | "yes" | "true" => true,
            "off" | "no" | "false" => false,
            _ => is_truthy(value),
        },
    }
}

fn clean_int(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        Value::Int(int) => *int,
        Value::Text(text) => {
            // Whole numeric strings ("1e3", "5.7") are truncated; `as` saturates.
            if let Some(number) = as_number(text) {
                return number as i64;
            }
            let Some(captures) = INTEGER_PREFIX.captures(text) else {
                return 0;
            };
            let negative = &captures[1] == "-";
            let number = format!("{}{}", &captures[1], &captures[2]);
            // Out of range integers saturate.
            number
                .parse::<i64>()
                .unwrap_or(if negative { i64::MIN } else { i64::MAX })
        }
    }
}

/// Strips every character that may not appear in a single filename.
pub fn clean_filename(raw: &str) -> String {
    let cleaned = FILE_ILLEGAL.replace_all(raw, "");
    match cleaned.as_ref() {
        "." | ".." => String::new(),
        _ => cleaned.into_owned(),
    }
}

/// Normalizes separators and strips characters that may not appear in a path.
pub fn clean_path(raw: &str) -> String {
    let path = raw.replace('\\', "/");
    let path = PATH_ILLEGAL.replace_all(&path, "");
    let path = PATH_DOTS.replace_all(&path, ".");
    let path = PATH_SLASHES.replace_all(&path, "/");
    PATH_DOT_SEGMENTS.replace_all(&path, "/").into_owned()
}

/// Keeps ASCII letters, digits, underscores and hyphens.
pub fn clean_alphaext(raw: &str) -> String {
    ALPHAEXT_ILLEGAL.replace_all(raw, "").into_owned()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Int(int) => *int != 0,
        Value::Text(text) => !(text.is_empty() || text == "0"),
    }
}

fn as_number(text: &str) -> Option<f64> {
    if NUMERIC.is_match(text) {
        text.trim().parse().ok()
    } else {
        None
    }
}

/// Type coercing equality.
///
/// Booleans compare by truthiness, numeric strings compare as numbers and
/// integers compare with non-numeric strings textually.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == is_truthy(other),
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Int(int), Value::Text(text)) | (Value::Text(text), Value::Int(int)) => {
            match as_number(text) {
                Some(number) => *int as f64 == number,
                None => int.to_string() == *text,
            }
        }
        (Value::Text(x), Value::Text(y)) => match (as_number(x), as_number(y)) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_are_coerced_never_rejected() {
        let cases = [
            (Value::from("yes"), true),
            (Value::from("Off"), false),
            (Value::from("0"), false),
            (Value::from(""), false),
            (Value::from("anything"), true),
            (Value::from(0), false),
            (Value::from(42), true),
        ];
        for (raw, expected) in cases {
            assert_eq!(clean(&raw, ValueKind::Boolean), Value::Bool(expected), "{raw}");
        }
    }

    #[test]
    fn integers_take_the_numeric_prefix() {
        assert_eq!(clean(&Value::from("5abc"), ValueKind::Integer), Value::Int(5));
        assert_eq!(clean(&Value::from(" -12"), ValueKind::Integer), Value::Int(-12));
        assert_eq!(clean(&Value::from("abc"), ValueKind::Integer), Value::Int(0));
        assert_eq!(clean(&Value::from(true), ValueKind::Integer), Value::Int(1));
    }

    #[test]
    fn numeric_strings_are_read_whole() {
        assert_eq!(clean(&Value::from("1e3"), ValueKind::Integer), Value::Int(1000));
        assert_eq!(clean(&Value::from("5.7"), ValueKind::Integer), Value::Int(5));
        assert_eq!(clean(&Value::from("-2.5e1"), ValueKind::Integer), Value::Int(-25));
        assert_eq!(clean(&Value::from("1e3abc"), ValueKind::Integer), Value::Int(1));
    }

    #[test]
    fn filenames_lose_separators_and_special_characters() {
        assert_eq!(clean_filename("backup.mbz"), "backup.mbz");
        assert_eq!(clean_filename("../etc/passwd"), "..etcpasswd");
        assert_eq!(clean_filename("a<b>:c|d"), "abcd");
        assert_eq!(clean_filename(".."), "");
        assert_eq!(clean_filename("tab\there"), "tabhere");
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(clean_path("/var/backups/course"), "/var/backups/course");
        assert_eq!(clean_path("C:\\temp\\x"), "C/temp/x");
        assert_eq!(clean_path("/a/../b"), "/a/b");
        assert_eq!(clean_path("/a//b///c"), "/a/b/c");
        assert_eq!(clean_path("/a/./b"), "/a/b");
    }

    #[test]
    fn alphaext_keeps_identifier_characters() {
        assert_eq!(clean_alphaext("valid_label-1"), "valid_label-1");
        assert_eq!(clean_alphaext("bad label!"), "badlabel");
    }

    #[test]
    fn loose_equality_coerces_numeric_strings() {
        assert!(loose_eq(&Value::Int(5), &Value::from("5")));
        assert!(loose_eq(&Value::Int(5), &Value::from(" 5")));
        assert!(loose_eq(&Value::Int(5), &Value::from("5.0")));
        assert!(!loose_eq(&Value::Int(5), &Value::from("5abc")));
        assert!(!loose_eq(&Value::Int(0), &Value::from("")));
        assert!(loose_eq(&Value::Int(1), &Value::Bool(true)));
        assert!(loose_eq(&Value::from("1e1"), &Value::from("10")));
        assert!(!loose_eq(&Value::from("abc"), &Value::from("abd")));
    }
}
