use serde_json::{Map, Value};

use crate::error::FilterError;

/// Raw configuration arguments of one filter, with typed accessors used by
/// each filter's `prepare`.
///
/// Accessors fail with `MissingArgument` when a required key is absent and
/// with `InvalidArgument` when a key holds the wrong type.
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    filter: String,
    values: Map<String, Value>,
}

impl FilterArgs {
    pub fn new(filter: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            filter: filter.into(),
            values,
        }
    }

    /// Name of the filter these arguments belong to.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn missing(&self, argument: &str) -> FilterError {
        FilterError::missing(&self.filter, argument)
    }

    pub fn invalid(&self, argument: &str, reason: impl Into<String>) -> FilterError {
        FilterError::invalid(&self.filter, argument, reason)
    }

    pub fn str(&self, key: &str) -> Result<Option<String>, FilterError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(self.invalid(key, format!("expected a string, found {other}"))),
        }
    }

    pub fn require_str(&self, key: &str) -> Result<String, FilterError> {
        self.str(key)?.ok_or_else(|| self.missing(key))
    }

    pub fn str_or(&self, key: &str, default: &str) -> Result<String, FilterError> {
        Ok(self.str(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, FilterError> {
        match self.get(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| self.invalid(key, format!("expected a boolean, found '{s}'"))),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, found {other}"))),
        }
    }

    pub fn usize(&self, key: &str) -> Result<Option<usize>, FilterError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(|n| Some(n as usize))
                .ok_or_else(|| self.invalid(key, format!("expected a positive integer, found {n}"))),
            Some(other) => Err(self.invalid(key, format!("expected an integer, found {other}"))),
        }
    }

    /// A list given either as an array of strings or as a comma-separated string.
    pub fn str_list(&self, key: &str) -> Result<Option<Vec<String>>, FilterError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(self.invalid(key, format!("expected strings, found {other}"))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(self.invalid(key, format!("expected a list, found {other}"))),
        }
    }

    pub fn require_str_list(&self, key: &str) -> Result<Vec<String>, FilterError> {
        match self.str_list(key)? {
            Some(list) if !list.is_empty() => Ok(list),
            _ => Err(self.missing(key)),
        }
    }
}
