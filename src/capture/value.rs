use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::sync::Arc;

/// Flattened representation of an error-like argument.
///
/// Produced once per error argument and consumed by the encoder; never
/// persisted. `stack` is the captured backtrace text and `chain` the
/// `source()` chain, outermost cause first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedError {
    pub name: String,
    pub message: String,
    pub stack: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, JsonValue>,
}

impl CapturedError {
    /// Flattens a concrete error. The name is the error's short type name.
    pub fn from_error<E: StdError>(err: &E) -> Self {
        Self::build(short_type_name::<E>(), err)
    }

    /// Flattens a type-erased error. The concrete type name is unavailable
    /// through `dyn Error`, so the name degrades to `"Error"`.
    pub fn from_dyn_error(err: &(dyn StdError + 'static)) -> Self {
        Self::build("Error".to_string(), err)
    }

    /// Attaches an extra field, the counterpart of an error's enumerable
    /// extra properties.
    pub fn with_extra(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    fn build(name: String, err: &(dyn StdError + '_)) -> Self {
        Self {
            name,
            message: err.to_string(),
            stack: Backtrace::force_capture().to_string(),
            chain: source_chain(err),
            extra: serde_json::Map::new(),
        }
    }
}

fn source_chain(err: &(dyn StdError + '_)) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full).to_string()
}

/// Shape of a captured argument.
#[derive(Debug)]
pub enum ValueKind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Error(CapturedError),
    List(Vec<CapturedValue>),
    Map(Vec<(String, CapturedValue)>),
}

/// A raw log argument, captured at the moment of interception.
///
/// Nodes are reference-counted and interiorly mutable so callers can build
/// shared or self-referential graphs; the serializer handles both without
/// looping or failing.
#[derive(Debug, Clone)]
pub struct CapturedValue {
    node: Arc<RwLock<ValueKind>>,
}

impl CapturedValue {
    pub fn new(kind: ValueKind) -> Self {
        Self {
            node: Arc::new(RwLock::new(kind)),
        }
    }

    pub fn null() -> Self {
        Self::new(ValueKind::Null)
    }

    pub fn list(items: Vec<CapturedValue>) -> Self {
        Self::new(ValueKind::List(items))
    }

    pub fn map(entries: Vec<(String, CapturedValue)>) -> Self {
        Self::new(ValueKind::Map(entries))
    }

    pub fn from_error<E: StdError>(err: &E) -> Self {
        Self::new(ValueKind::Error(CapturedError::from_error(err)))
    }

    pub fn from_dyn_error(err: &(dyn StdError + 'static)) -> Self {
        Self::new(ValueKind::Error(CapturedError::from_dyn_error(err)))
    }

    /// Appends an element to a list node. No-op on other kinds; this is how
    /// self-referential graphs are built.
    pub fn push(&self, item: CapturedValue) {
        if let Some(mut guard) = self.node.try_write()
            && let ValueKind::List(items) = &mut *guard
        {
            items.push(item);
        }
    }

    /// Inserts an entry into a map node. No-op on other kinds.
    pub fn insert(&self, key: impl Into<String>, value: CapturedValue) {
        if let Some(mut guard) = self.node.try_write()
            && let ValueKind::Map(entries) = &mut *guard
        {
            entries.push((key.into(), value));
        }
    }

    /// Pointer identity of the underlying node, used by the cycle guard.
    pub(crate) fn node_id(&self) -> usize {
        Arc::as_ptr(&self.node) as usize
    }

    /// Reads the node kind without ever blocking. `None` when the lock is
    /// unavailable; the serializer degrades to its placeholder in that case.
    pub(crate) fn with_kind<R>(&self, f: impl FnOnce(&ValueKind) -> R) -> Option<R> {
        self.node.try_read().map(|guard| f(&guard))
    }

    #[cfg(test)]
    pub(crate) fn write_lock_for_tests(&self) -> parking_lot::RwLockWriteGuard<'_, ValueKind> {
        self.node.write()
    }
}

impl From<&str> for CapturedValue {
    fn from(value: &str) -> Self {
        Self::new(ValueKind::Text(value.to_string()))
    }
}

impl From<String> for CapturedValue {
    fn from(value: String) -> Self {
        Self::new(ValueKind::Text(value))
    }
}

impl From<bool> for CapturedValue {
    fn from(value: bool) -> Self {
        Self::new(ValueKind::Bool(value))
    }
}

impl From<i32> for CapturedValue {
    fn from(value: i32) -> Self {
        Self::new(ValueKind::Int(value.into()))
    }
}

impl From<i64> for CapturedValue {
    fn from(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }
}

impl From<u64> for CapturedValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self::new(ValueKind::Int(v)),
            Err(_) => Self::new(ValueKind::Float(value as f64)),
        }
    }
}

impl From<f64> for CapturedValue {
    fn from(value: f64) -> Self {
        Self::new(ValueKind::Float(value))
    }
}

impl From<JsonValue> for CapturedValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::null(),
            JsonValue::Bool(b) => Self::from(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::from(i)
                } else if let Some(u) = n.as_u64() {
                    Self::from(u)
                } else {
                    Self::from(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Self::from(s),
            JsonValue::Array(items) => Self::list(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => {
                Self::map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
