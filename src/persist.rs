//! Persistence adapter: the JSON element-list schema and key-value stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! The engine never talks to a store on its own. Hosts call [`load`] at
//! startup and feed the result to `EngineCore::load`, then call [`save`] with
//! `EngineCore::snapshot()` whenever the engine emits `Action::SaveRequested`.
//!
//! The stored value is a JSON array of
//! `{x, y, width, height, selected, cornerRadius?}` objects. A payload that is
//! not an array, or any element that fails to decode, fails the whole load.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::HashMap;

use tracing::info;

use crate::doc::DiagramElement;

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("persisted diagram is not a JSON array")]
    NotAnArray,
    #[error("persisted diagram is not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid element at index {index}: {reason}")]
    InvalidElement { index: usize, reason: String },
    #[error("failed to encode diagram: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

/// A string key-value store.
pub trait KeyValueStore {
    /// Read the value under `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if the backing store is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] if the backing store rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// Process-local store, used natively and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Browser `localStorage`.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    /// Open the current window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Storage`] when there is no window or storage
    /// access is denied.
    pub fn from_window() -> Result<Self, PersistError> {
        let window = web_sys::window().ok_or_else(|| PersistError::Storage("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistError::Storage(format!("{e:?}")))?
            .ok_or_else(|| PersistError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistError::Storage(format!("{e:?}")))
    }
}

/// Decode a persisted element list.
///
/// Absent `cornerRadius` decodes as 0 and absent `selected` as false. Every
/// element gets a fresh runtime id.
///
/// # Errors
///
/// Fails on invalid JSON, a non-array payload, a missing or non-numeric
/// geometry field, or negative extents or radius.
pub fn decode(raw: &str) -> Result<Vec<DiagramElement>, PersistError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(PersistError::Decode)?;
    let serde_json::Value::Array(items) = value else {
        return Err(PersistError::NotAnArray);
    };

    let mut elements = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let element: DiagramElement = serde_json::from_value(item)
            .map_err(|e| PersistError::InvalidElement { index, reason: e.to_string() })?;
        check_element(index, &element)?;
        elements.push(element);
    }
    Ok(elements)
}

/// Encode an element list in the persisted schema.
///
/// # Errors
///
/// Returns [`PersistError::Encode`] if serialization fails.
pub fn encode(elements: &[DiagramElement]) -> Result<String, PersistError> {
    serde_json::to_string(elements).map_err(PersistError::Encode)
}

/// Read and decode the element list under `key`. A missing key is an empty diagram.
///
/// # Errors
///
/// Propagates store failures and [`decode`] failures.
pub fn load(store: &dyn KeyValueStore, key: &str) -> Result<Vec<DiagramElement>, PersistError> {
    let Some(raw) = store.get(key)? else {
        info!(%key, "no persisted diagram; starting empty");
        return Ok(Vec::new());
    };
    let elements = decode(&raw)?;
    info!(%key, count = elements.len(), "loaded persisted diagram");
    Ok(elements)
}

/// Encode `elements` and write them under `key`.
///
/// # Errors
///
/// Propagates encode and store failures.
pub fn save(store: &mut dyn KeyValueStore, key: &str, elements: &[DiagramElement]) -> Result<(), PersistError> {
    let raw = encode(elements)?;
    store.set(key, &raw)?;
    info!(%key, count = elements.len(), "saved diagram");
    Ok(())
}

fn check_element(index: usize, element: &DiagramElement) -> Result<(), PersistError> {
    let fields = [
        ("width", element.width),
        ("height", element.height),
        ("cornerRadius", element.corner_radius),
    ];
    for (name, value) in fields {
        if value < 0.0 {
            return Err(PersistError::InvalidElement { index, reason: format!("{name} is negative ({value})") });
        }
    }
    Ok(())
}
