//! Record storage behind the HTTP routes.
//!
//! Records are JSON objects keyed by model name. Every stored record carries
//! an integer `id` assigned by the store on first save.

mod memory;

pub use memory::MemoryStore;

use bmb_core::Result;
use serde_json::{Map, Value};

/// A stored row.
pub type Record = Map<String, Value>;

/// Persistence operations the routes rely on.
///
/// Implementations must be safe to share across request tasks. Operations are
/// individually atomic; nothing spans two calls.
pub trait ModelStore: Send + Sync {
    /// Every record of a model, in id order.
    fn all(&self, model: &str) -> Result<Vec<Record>>;

    fn get(&self, model: &str, id: i64) -> Result<Option<Record>>;

    /// First record whose `field` equals `value`.
    fn first(&self, model: &str, field: &str, value: &Value) -> Result<Option<Record>> {
        Ok(self.filter(model, field, value)?.into_iter().next())
    }

    /// All records whose `field` equals `value`.
    fn filter(&self, model: &str, field: &str, value: &Value) -> Result<Vec<Record>>;

    fn count(&self, model: &str) -> Result<usize> {
        Ok(self.all(model)?.len())
    }

    /// Number of records whose `field` equals `value`.
    fn count_where(&self, model: &str, field: &str, value: &Value) -> Result<usize> {
        Ok(self.filter(model, field, value)?.len())
    }

    /// Insert or replace a record. A record without an integer `id` is
    /// inserted under a fresh id. Returns the stored record.
    fn save(&self, model: &str, record: Record) -> Result<Record>;

    /// Delete a record. Returns `false` when it did not exist.
    fn delete(&self, model: &str, id: i64) -> Result<bool>;
}

/// The integer `id` of a record, if it has one.
pub fn record_id(record: &Record) -> Option<i64> {
    record.get("id").and_then(Value::as_i64)
}
