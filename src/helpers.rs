//! Text helpers available to templates next to the project functions.
//!
//! MiniJinja's builtins already cover `default`, `trim`, `upper`, `lower`,
//! `replace` and `tojson`. This module adds the helpers deployment and secret
//! templates commonly pipe values through: `b64enc`, `b64dec`, `quote`,
//! `squote`, `indent`, `nindent`, `trimPrefix` and `trimSuffix`.
//!
//! `indent` replaces MiniJinja's builtin of the same name: every line,
//! including the first, is indented.

use base64::{engine::general_purpose, Engine as _};
use minijinja::{Environment, Error, ErrorKind, Value};

/// Registers the helpers as filters, and the base64 pair as functions too.
pub fn register_helpers(env: &mut Environment<'static>) {
    env.add_filter("b64enc", b64enc);
    env.add_filter("b64dec", b64dec);
    env.add_function("b64enc", b64enc);
    env.add_function("b64dec", b64dec);
    env.add_filter("quote", quote);
    env.add_filter("squote", squote);
    env.add_filter("indent", indent);
    env.add_filter("nindent", nindent);
    env.add_filter("trimPrefix", trim_prefix);
    env.add_filter("trimSuffix", trim_suffix);
}

pub fn b64enc(value: String) -> String {
    general_purpose::STANDARD.encode(value)
}

pub fn b64dec(value: String) -> Result<String, Error> {
    let bytes = general_purpose::STANDARD.decode(value.trim()).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, format!("invalid base64 input: {e}"))
    })?;
    String::from_utf8(bytes).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, format!("decoded base64 is not UTF-8: {e}"))
    })
}

/// Wraps a value in double quotes, escaping it like a JSON string.
pub fn quote(value: Value) -> String {
    serde_json::Value::String(plain(&value)).to_string()
}

pub fn squote(value: Value) -> String {
    format!("'{}'", plain(&value))
}

/// Indents every line of `value` by `width` spaces.
pub fn indent(value: String, width: usize) -> String {
    let pad = " ".repeat(width);
    format!("{pad}{}", value.replace('\n', &format!("\n{pad}")))
}

/// Like [`indent`], on a new line.
pub fn nindent(value: String, width: usize) -> String {
    format!("\n{}", indent(value, width))
}

fn trim_prefix(value: String, prefix: String) -> String {
    value.strip_prefix(prefix.as_str()).unwrap_or(&value).to_string()
}

fn trim_suffix(value: String, suffix: String) -> String {
    value.strip_suffix(suffix.as_str()).unwrap_or(&value).to_string()
}

/// Undefined and none render as the empty string.
fn plain(value: &Value) -> String {
    if value.is_undefined() || value.is_none() {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64() {
        assert_eq!(b64enc("pw".to_string()), "cHc=");
        assert_eq!(b64dec("cHc=".to_string()).unwrap(), "pw");
        assert!(b64dec("not base64!".to_string()).is_err());
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote(Value::from("say \"hi\"")), r#""say \"hi\"""#);
        assert_eq!(quote(Value::from(8080)), r#""8080""#);
        assert_eq!(squote(Value::from("a b")), "'a b'");
        assert_eq!(quote(Value::UNDEFINED), r#""""#);
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a: 1\nb: 2".to_string(), 2), "  a: 1\n  b: 2");
        assert_eq!(nindent("a: 1".to_string(), 4), "\n    a: 1");
    }

    #[test]
    fn test_trim_affixes() {
        assert_eq!(trim_prefix("v1.2.0".to_string(), "v".to_string()), "1.2.0");
        assert_eq!(trim_suffix("api.yaml".to_string(), ".yaml".to_string()), "api");
        assert_eq!(trim_prefix("api".to_string(), "x".to_string()), "api");
    }
}
