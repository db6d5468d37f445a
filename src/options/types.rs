//! Scalar typings and value coercion for options

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Declared scalar type of an option value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfType {
    Str,
    Int,
    Float,
    Bool,
    Dict,
    Uri,
}

impl ConfType {
    /// Coerce a raw stored value into this type
    ///
    /// Returns a human-readable reason when the value cannot be represented.
    /// JSON booleans always pass through untouched so a stored `false` is
    /// never confused with a missing value.
    pub fn coerce(&self, value: &Value) -> Result<Value, String> {
        match self {
            ConfType::Bool => coerce_bool(value),
            ConfType::Int => coerce_int(value),
            ConfType::Float => coerce_float(value),
            ConfType::Str => coerce_str(value),
            ConfType::Dict => coerce_dict(value),
            ConfType::Uri => coerce_uri(value),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfType::Str => "str",
            ConfType::Int => "int",
            ConfType::Float => "float",
            ConfType::Bool => "bool",
            ConfType::Dict => "dict",
            ConfType::Uri => "uri",
        }
    }
}

impl fmt::Display for ConfType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn coerce_bool(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(Value::Bool(false)),
            Some(1) => Ok(Value::Bool(true)),
            _ => Err(format!("expected bool, got number {}", n)),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
            _ => Err(format!("expected bool, got '{}'", s)),
        },
        other => Err(format!("expected bool, got {}", other)),
    }
}

fn coerce_int(value: &Value) -> Result<Value, String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Ok(Value::from(f as i64))
            }
            _ => Err(format!("expected int, got {}", n)),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("expected int, got '{}'", s)),
        other => Err(format!("expected int, got {}", other)),
    }
}

fn coerce_float(value: &Value) -> Result<Value, String> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("expected float, got {}", value))
}

fn coerce_str(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        other => Err(format!("expected str, got {}", other)),
    }
}

fn coerce_dict(value: &Value) -> Result<Value, String> {
    match value {
        Value::Object(_) => Ok(value.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ Value::Object(_)) => Ok(parsed),
            _ => Err(format!("expected dict, got '{}'", s)),
        },
        other => Err(format!("expected dict, got {}", other)),
    }
}

fn coerce_uri(value: &Value) -> Result<Value, String> {
    let Value::String(s) = value else {
        return Err(format!("expected uri, got {}", value));
    };

    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return Err(format!("'{}' is not a valid uri", s));
    }

    // Either scheme://rest or host[:port]
    let valid = match trimmed.split_once("://") {
        Some((scheme, rest)) => !scheme.is_empty() && !rest.is_empty(),
        None => match trimmed.rsplit_once(':') {
            Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
            None => true,
        },
    };

    if valid {
        Ok(Value::String(trimmed.to_string()))
    } else {
        Err(format!("'{}' is not a valid uri", s))
    }
}

/// Split a raw value into list elements
///
/// Arrays pass through. Strings holding a JSON array are parsed, any other
/// string is treated as comma-separated (the shape environment-provisioned
/// settings arrive in).
pub fn split_list(value: &Value) -> Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        Value::String(s) => {
            if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
                return Ok(items);
            }
            Ok(s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| Value::String(item.to_string()))
                .collect())
        }
        other => Err(format!("expected list, got {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bool_passthrough_keeps_false() {
        assert_eq!(ConfType::Bool.coerce(&json!(false)).unwrap(), json!(false));
        assert_eq!(ConfType::Bool.coerce(&json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn test_bool_from_strings_and_numbers() {
        assert_eq!(ConfType::Bool.coerce(&json!("False")).unwrap(), json!(false));
        assert_eq!(ConfType::Bool.coerce(&json!("yes")).unwrap(), json!(true));
        assert_eq!(ConfType::Bool.coerce(&json!(0)).unwrap(), json!(false));
        assert!(ConfType::Bool.coerce(&json!("maybe")).is_err());
        assert!(ConfType::Bool.coerce(&json!(2)).is_err());
    }

    #[test]
    fn test_int_coercion() {
        assert_eq!(ConfType::Int.coerce(&json!(42)).unwrap(), json!(42));
        assert_eq!(ConfType::Int.coerce(&json!("3600")).unwrap(), json!(3600));
        assert_eq!(ConfType::Int.coerce(&json!(5.0)).unwrap(), json!(5));
        assert!(ConfType::Int.coerce(&json!(5.5)).is_err());
        assert!(ConfType::Int.coerce(&json!("abc")).is_err());
    }

    #[test]
    fn test_float_and_str_coercion() {
        assert_eq!(ConfType::Float.coerce(&json!("1.5")).unwrap(), json!(1.5));
        assert_eq!(ConfType::Str.coerce(&json!(12)).unwrap(), json!("12"));
        assert!(ConfType::Str.coerce(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_dict_coercion() {
        assert_eq!(
            ConfType::Dict.coerce(&json!(r#"{"gpu": "true"}"#)).unwrap(),
            json!({"gpu": "true"})
        );
        assert!(ConfType::Dict.coerce(&json!("[1, 2]")).is_err());
    }

    #[test]
    fn test_uri_coercion() {
        assert!(ConfType::Uri.coerce(&json!("registry.local:5000")).is_ok());
        assert!(ConfType::Uri.coerce(&json!("https://registry.local")).is_ok());
        assert!(ConfType::Uri.coerce(&json!("registry.local:port")).is_err());
        assert!(ConfType::Uri.coerce(&json!("has space")).is_err());
        assert!(ConfType::Uri.coerce(&json!("")).is_err());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(&json!(["a", "b"])).unwrap(), vec![json!("a"), json!("b")]);
        assert_eq!(split_list(&json!("[1, 2]")).unwrap(), vec![json!(1), json!(2)]);
        assert_eq!(split_list(&json!("a, b,")).unwrap(), vec![json!("a"), json!("b")]);
        assert!(split_list(&json!(3)).is_err());
    }
}
