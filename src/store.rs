//! Host-provided persistence modelled as a scoped key-value store.
//!
//! Fields are declared up front with a scope and a default value; reads of
//! absent (or undecodable) values yield the declared default.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::DragDropError;

/// Visibility of a stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Authored content, shared by every learner of a problem.
    Content,
    /// Author settings of a problem.
    Settings,
    /// Per-learner, per-problem state.
    UserState,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldKey {
    pub scope: Scope,
    pub owner: String,
    pub name: &'static str,
}

/// Typed field declaration.
pub struct Field<T> {
    pub name: &'static str,
    pub scope: Scope,
    default: fn() -> T,
}

impl<T> Field<T> {
    pub const fn new(name: &'static str, scope: Scope, default: fn() -> T) -> Self {
        Self { name, scope, default }
    }

    pub fn key(&self, owner: &str) -> FieldKey {
        FieldKey { scope: self.scope, owner: owner.to_string(), name: self.name }
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

/// Persistence collaborator supplied by the host.
pub trait FieldStore: Send + Sync {
    fn get(&self, key: &FieldKey) -> Option<Value>;
    fn set(&self, key: FieldKey, value: Value);
}

pub fn read_field<T: DeserializeOwned>(store: &dyn FieldStore, owner: &str, field: &Field<T>) -> T {
    let key = field.key(owner);
    match store.get(&key) {
        None => field.default_value(),
        Some(v) => serde_json::from_value(v).unwrap_or_else(|e| {
            warn!(target: "dragdrop_backend", owner, field = field.name, error = %e, "Stored value is undecodable; using default");
            field.default_value()
        }),
    }
}

pub fn write_field<T: Serialize>(
    store: &dyn FieldStore,
    owner: &str,
    field: &Field<T>,
    value: &T,
) -> Result<(), DragDropError> {
    let encoded = serde_json::to_value(value).map_err(|e| DragDropError::Storage(e.to_string()))?;
    store.set(field.key(owner), encoded);
    Ok(())
}

/// In-process store used when no external host persistence is wired in.
#[derive(Default)]
pub struct MemoryFieldStore {
    values: RwLock<HashMap<FieldKey, Value>>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FieldStore for MemoryFieldStore {
    fn get(&self, key: &FieldKey) -> Option<Value> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: FieldKey, value: Value) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seven() -> u32 {
        7
    }

    const COUNTER: Field<u32> = Field::new("counter", Scope::UserState, seven);

    #[test]
    fn test_absent_field_reads_default() {
        let store = MemoryFieldStore::new();
        assert_eq!(read_field(&store, "p/l", &COUNTER), 7);
    }

    #[test]
    fn test_write_then_read() {
        let store = MemoryFieldStore::new();
        write_field(&store, "p/l", &COUNTER, &3).unwrap();
        assert_eq!(read_field(&store, "p/l", &COUNTER), 3);
        // Other owners are unaffected.
        assert_eq!(read_field(&store, "p/other", &COUNTER), 7);
    }

    #[test]
    fn test_undecodable_value_reads_default() {
        let store = MemoryFieldStore::new();
        store.set(COUNTER.key("p/l"), json!("not a number"));
        assert_eq!(read_field(&store, "p/l", &COUNTER), 7);
    }

    #[test]
    fn test_scopes_are_distinct_keys() {
        let user = Field::<u32>::new("x", Scope::UserState, seven);
        let content = Field::<u32>::new("x", Scope::Content, seven);
        assert_ne!(user.key("o"), content.key("o"));
    }
}
