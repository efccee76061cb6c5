use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Store;
use crate::error::StoreError;

impl Store {
    /// Fetch and deserialize the blob under `key`. `Ok(None)` when the key is
    /// absent; `Malformed` when the stored JSON does not fit `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get_raw(key)? {
            None => Ok(None),
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|source| StoreError::Malformed {
                    key: key.to_string(),
                    source,
                }),
        }
    }

    /// Serialize and store `value` under `key`, replacing any previous blob.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let text = serde_json::to_string(value).map_err(|source| StoreError::Malformed {
            key: key.to_string(),
            source,
        })?;
        self.set_raw(key, &text)
    }

    /// Returns true if a blob was actually removed.
    pub fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
            Ok(n > 0)
        })
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
            stmt.query_row([key], |row| row.get::<_, String>(0)).optional()
        })
    }

    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                (key, value),
            )?;
            Ok(())
        })
    }
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Progress {
        xp: u32,
        badges: Vec<String>,
    }

    #[test]
    fn set_get_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let progress = Progress {
            xp: 120,
            badges: vec!["reader".into(), "artist".into()],
        };

        store.set(&keys::student_data("s1"), &progress).unwrap();
        let loaded: Option<Progress> = store.get(&keys::student_data("s1")).unwrap();

        assert_eq!(loaded, Some(progress));
    }

    #[test]
    fn missing_key_is_none() {
        let store = Store::open_in_memory().unwrap();
        let loaded: Option<Progress> = store.get("nothingHere").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn overwrite_replaces_value() {
        let store = Store::open_in_memory().unwrap();
        store.set("k", &Progress { xp: 1, badges: vec![] }).unwrap();
        store.set("k", &Progress { xp: 2, badges: vec![] }).unwrap();

        let loaded: Option<Progress> = store.get("k").unwrap();
        assert_eq!(loaded.unwrap().xp, 2);
    }

    #[test]
    fn delete_removes_key() {
        let store = Store::open_in_memory().unwrap();
        store.set("k", &Progress { xp: 1, badges: vec![] }).unwrap();

        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());

        let loaded: Option<Progress> = store.get("k").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_blob_surfaces_error() {
        let store = Store::open_in_memory().unwrap();
        store.set_raw("k", "{not json").unwrap();

        let err = store.get::<Progress>("k").unwrap_err();
        assert!(matches!(err, StoreError::Malformed { ref key, .. } if key == "k"));
    }
}
