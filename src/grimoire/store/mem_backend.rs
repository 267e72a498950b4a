use super::backend::KvBackend;
use crate::error::{GrimoireError, Result};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// In-memory key-value backend for tests and ephemeral sessions.
///
/// Uses `RefCell` for interior mutability since the grimoire is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    values: RefCell<HashMap<String, Value>>,
    simulate_write_error: Cell<bool>,
    writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl KvBackend for MemBackend {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(GrimoireError::Store("Simulated write error".to_string()));
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
