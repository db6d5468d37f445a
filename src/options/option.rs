//! Option descriptors and their dict representation

use super::types::{split_list, ConfType};
use crate::conf::error::ConfError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder shown instead of a secret option's value
pub const SECRET_PLACEHOLDER: &str = "********";

/// Backend that owns an option's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionStore {
    /// Process-wide settings, provisioned out-of-band and read-only at runtime
    Settings,
    /// Owner-scoped rows in the config database
    Persisted,
}

impl OptionStore {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionStore::Settings => "settings",
            OptionStore::Persisted => "persisted",
        }
    }
}

impl fmt::Display for OptionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static metadata describing one configurable key
///
/// Descriptors are immutable once built. To change a descriptor (for instance
/// its `cache_ttl`), subscribe a new one under the same key; the later
/// subscription replaces the earlier one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    /// Unique key (e.g., "K8S_NAMESPACE")
    pub key: String,

    /// Applies cluster-wide rather than per owner
    pub is_global: bool,

    /// Value must be redacted in any dict representation
    pub is_secret: bool,

    /// When false, resolution fails unless the backend holds a value
    pub is_optional: bool,

    /// Value is a homogeneous ordered sequence
    pub is_list: bool,

    /// Backend that owns this key
    pub store: OptionStore,

    /// Scalar type used for coercion; `None` keeps values opaque
    pub typing: Option<ConfType>,

    /// Substituted when the backend has no entry and the option is optional
    pub default: Option<Value>,

    /// Allowed values
    pub options: Option<Vec<Value>>,

    /// Seconds a resolved value may be served from cache; 0 disables caching
    pub cache_ttl: u64,

    /// Help text for generated forms
    pub description: String,
}

impl OptionDescriptor {
    /// Coerce a raw value to this option's declared shape
    ///
    /// Applies list splitting, per-element typing and the allowed-values
    /// constraint, in that order.
    pub fn coerce(&self, value: &Value) -> Result<Value, ConfError> {
        if self.is_list {
            let items = split_list(value).map_err(|reason| ConfError::invalid(&self.key, reason))?;
            let coerced = items
                .iter()
                .map(|item| self.coerce_scalar(item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(coerced))
        } else {
            self.coerce_scalar(value)
        }
    }

    fn coerce_scalar(&self, value: &Value) -> Result<Value, ConfError> {
        let coerced = match self.typing {
            Some(ty) => ty
                .coerce(value)
                .map_err(|reason| ConfError::invalid(&self.key, reason))?,
            None => value.clone(),
        };

        if let Some(allowed) = &self.options {
            if !allowed.contains(&coerced) {
                return Err(ConfError::invalid(
                    &self.key,
                    format!("{} is not one of the allowed values {:?}", coerced, allowed),
                ));
            }
        }

        Ok(coerced)
    }

    /// Normalized representation of this option holding `value`
    ///
    /// Secret values are replaced by [`SECRET_PLACEHOLDER`]. An absent value
    /// stays `null` so callers can still tell "unset" apart from "set".
    pub fn to_dict(&self, value: Option<Value>) -> OptionDict {
        let value = match value {
            Some(_) if self.is_secret => Value::String(SECRET_PLACEHOLDER.to_string()),
            Some(value) => value,
            None => Value::Null,
        };

        OptionDict {
            key: self.key.clone(),
            value,
            typing: self.typing,
            is_secret: self.is_secret,
            is_list: self.is_list,
            is_global: self.is_global,
            is_optional: self.is_optional,
            description: self.description.clone(),
        }
    }
}

/// Dict representation returned to admin surfaces and form builders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDict {
    pub key: String,
    pub value: Value,
    pub typing: Option<ConfType>,
    pub is_secret: bool,
    pub is_list: bool,
    pub is_global: bool,
    pub is_optional: bool,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionBuilder;
    use serde_json::json;

    #[test]
    fn test_list_coercion_with_allowed_values() {
        let def = OptionBuilder::new("BUILD_STEPS")
            .list()
            .typing(ConfType::Str)
            .allowed(vec![json!("pip"), json!("apt")])
            .build()
            .unwrap();

        assert_eq!(def.coerce(&json!("pip, apt")).unwrap(), json!(["pip", "apt"]));
        assert!(def.coerce(&json!(["pip", "brew"])).is_err());
    }

    #[test]
    fn test_to_dict_redacts_secrets() {
        let def = OptionBuilder::new("PASSWORD")
            .secret()
            .typing(ConfType::Str)
            .build()
            .unwrap();

        let dict = def.to_dict(Some(json!("hunter2")));
        assert_eq!(dict.value, json!(SECRET_PLACEHOLDER));
        assert!(dict.is_secret);

        // Absent stays absent even for secrets
        assert_eq!(def.to_dict(None).value, Value::Null);
    }

    #[test]
    fn test_to_dict_serializes_bool_false() {
        let def = OptionBuilder::new("BOOL_KEY")
            .typing(ConfType::Bool)
            .default(json!(true))
            .build()
            .unwrap();

        let dict = serde_json::to_value(def.to_dict(Some(json!(false)))).unwrap();
        assert_eq!(dict["value"], json!(false));
        assert_eq!(dict["typing"], json!("bool"));
        assert_eq!(dict["key"], json!("BOOL_KEY"));
    }
}
