use crate::error::Result;
use serde_json::Value;

/// Abstract interface for the key-value substrate.
///
/// The store only ever reads and writes whole aggregates under fixed keys, so
/// the substrate needs nothing beyond `get` and `set` within one named database.
/// A `set` MUST either fully succeed or fully fail: a failed write leaves the
/// previous value readable.
pub trait KvBackend {
    /// Read the value stored under `key`, or `Ok(None)` if nothing was ever stored.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &Value) -> Result<()>;
}
