//! Shared key-value context passed to every step of a pipeline run

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when reading or writing context values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("context key '{0}' is not set")]
    Missing(String),

    #[error("context key '{key}' is not a {expected}")]
    WrongType { key: String, expected: &'static str },

    #[error("context key '{0}' is already set (strict context)")]
    Overwrite(String),
}

/// Mutable store shared by all steps of one pipeline run.
///
/// Later steps may overwrite keys written by earlier ones. In strict mode,
/// [`Context::set`] refuses to replace an existing key and steps must call
/// [`Context::overwrite`] to do so on purpose.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: BTreeMap<String, Value>,
    strict: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Insert a value, honoring strict mode
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), ContextError> {
        let key = key.into();
        if self.strict && self.values.contains_key(&key) {
            return Err(ContextError::Overwrite(key));
        }
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Insert a value, replacing any previous one regardless of strict mode
    pub fn overwrite(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    pub fn require_str(&self, key: &str) -> Result<&str, ContextError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Err(ContextError::Missing(key.to_string())),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ContextError::WrongType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    pub fn require_path(&self, key: &str) -> Result<PathBuf, ContextError> {
        self.require_str(key).map(PathBuf::from)
    }

    /// Read a list of strings; a missing key is an empty list
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, ContextError> {
        match self.values.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or(ContextError::WrongType {
                        key: key.to_string(),
                        expected: "list of strings",
                    })
                })
                .collect(),
            Some(_) => Err(ContextError::WrongType {
                key: key.to_string(),
                expected: "list of strings",
            }),
        }
    }
}
