use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use bmb_core::{BmbError, Result};
use serde_json::Value;

use super::{record_id, ModelStore, Record};

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Record>,
}

/// Process-local store. Contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|_| BmbError::Internal("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|_| BmbError::Internal("store lock poisoned".to_string()))
    }
}

impl ModelStore for MemoryStore {
    fn all(&self, model: &str) -> Result<Vec<Record>> {
        Ok(self
            .read()?
            .get(model)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default())
    }

    fn get(&self, model: &str, id: i64) -> Result<Option<Record>> {
        Ok(self
            .read()?
            .get(model)
            .and_then(|t| t.rows.get(&id).cloned()))
    }

    fn filter(&self, model: &str, field: &str, value: &Value) -> Result<Vec<Record>> {
        Ok(self
            .read()?
            .get(model)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| r.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn count(&self, model: &str) -> Result<usize> {
        Ok(self.read()?.get(model).map_or(0, |t| t.rows.len()))
    }

    fn count_where(&self, model: &str, field: &str, value: &Value) -> Result<usize> {
        Ok(self.read()?.get(model).map_or(0, |t| {
            t.rows.values().filter(|r| r.get(field) == Some(value)).count()
        }))
    }

    fn save(&self, model: &str, mut record: Record) -> Result<Record> {
        let mut tables = self.write()?;
        let table = tables.entry(model.to_string()).or_default();

        let id = match record_id(&record) {
            Some(id) => {
                table.last_id = table.last_id.max(id);
                id
            }
            None => {
                table.last_id += 1;
                record.insert("id".to_string(), Value::from(table.last_id));
                table.last_id
            }
        };

        table.rows.insert(id, record.clone());
        Ok(record)
    }

    fn delete(&self, model: &str, id: i64) -> Result<bool> {
        Ok(self
            .write()?
            .get_mut(model)
            .is_some_and(|t| t.rows.remove(&id).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_save_assigns_ids() {
        let store = MemoryStore::new();
        let a = store.save("Product", record(json!({"name": "a"}))).unwrap();
        let b = store.save("Product", record(json!({"name": "b"}))).unwrap();

        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);
        assert_eq!(store.count("Product").unwrap(), 2);
        assert_eq!(store.count("Order").unwrap(), 0);
    }

    #[test]
    fn test_save_replaces_existing() {
        let store = MemoryStore::new();
        let mut item = store.save("Product", record(json!({"name": "a"}))).unwrap();
        item.insert("name".to_string(), json!("renamed"));
        store.save("Product", item).unwrap();

        let all = store.all("Product").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["name"], "renamed");
    }

    #[test]
    fn test_first_and_filter() {
        let store = MemoryStore::new();
        store.save("User", record(json!({"email": "a@x.io", "age": 30}))).unwrap();
        store.save("User", record(json!({"email": "b@x.io", "age": 30}))).unwrap();

        let found = store.first("User", "email", &json!("b@x.io")).unwrap().unwrap();
        assert_eq!(found["id"], 2);
        assert_eq!(store.filter("User", "age", &json!(30)).unwrap().len(), 2);
        assert!(store.first("User", "email", &json!("c@x.io")).unwrap().is_none());
    }

    #[test]
    fn test_count_where() {
        let store = MemoryStore::new();
        store.save("User", record(json!({"age": 25}))).unwrap();
        store.save("User", record(json!({"age": 30}))).unwrap();
        store.save("User", record(json!({"age": 30}))).unwrap();

        assert_eq!(store.count_where("User", "age", &json!(30)).unwrap(), 2);
        assert_eq!(store.count_where("User", "age", &json!(18)).unwrap(), 0);
        assert_eq!(store.count_where("Order", "age", &json!(30)).unwrap(), 0);
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        store.save("Tag", record(json!({"label": "x"}))).unwrap();

        assert!(store.delete("Tag", 1).unwrap());
        assert!(!store.delete("Tag", 1).unwrap());
        assert!(!store.delete("Missing", 1).unwrap());
        assert!(store.get("Tag", 1).unwrap().is_none());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = MemoryStore::new();
        store.save("Tag", record(json!({}))).unwrap();
        store.save("Tag", record(json!({}))).unwrap();
        store.delete("Tag", 2).unwrap();

        let next = store.save("Tag", record(json!({}))).unwrap();
        assert_eq!(next["id"], 3);
    }
}
