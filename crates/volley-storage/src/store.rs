use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::db::init_db;
use crate::error::{Result, StorageError};
use crate::types::{BroadcastConfig, NewBroadcastConfig};

/// Thread-safe store for saved broadcast configs.
///
/// Wraps a single SQLite connection in a `Mutex` — sufficient for a
/// single-node dashboard; swap in a pool if that ever changes.
pub struct ConfigStore {
    db: Mutex<Connection>,
}

const CONFIG_SELECT: &str = "SELECT id, owner_email, name, token, message,
        channel_ids, delay_seconds, image_urls, created_at FROM configs";

impl ConfigStore {
    /// Wrap an already-open connection, running migrations first.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// All configs saved by `owner_email`, newest first.
    pub fn list(&self, owner_email: &str) -> Result<Vec<BroadcastConfig>> {
        let db = self.db.lock().unwrap();
        let mut stmt =
            db.prepare(&format!("{CONFIG_SELECT} WHERE owner_email = ?1 ORDER BY id DESC"))?;
        let rows = stmt.query_map([owner_email], row_to_config)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// Fetch a config by id, `None` if it does not exist.
    pub fn get(&self, id: i64) -> Result<Option<BroadcastConfig>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            &format!("{CONFIG_SELECT} WHERE id = ?1"),
            [id],
            row_to_config,
        ) {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Database(e)),
        }
    }

    /// Insert a new config for `owner_email` and return the stored record.
    pub fn save(&self, owner_email: &str, new: NewBroadcastConfig) -> Result<BroadcastConfig> {
        let created_at = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO configs
             (owner_email, name, token, message, channel_ids,
              delay_seconds, image_urls, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                owner_email,
                new.name,
                new.token,
                new.message,
                join_list(&new.channel_ids),
                new.delay_seconds,
                join_list(&new.image_urls),
                created_at,
            ],
        )?;
        let id = db.last_insert_rowid();
        debug!(config_id = id, owner = %owner_email, "config saved");

        db.query_row(
            &format!("{CONFIG_SELECT} WHERE id = ?1"),
            [id],
            row_to_config,
        )
        .map_err(StorageError::Database)
    }

    /// Delete a config by id. Returns `NotFound` if no row was removed.
    pub fn delete(&self, id: i64) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute("DELETE FROM configs WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StorageError::NotFound { id });
        }
        debug!(config_id = id, "config deleted");
        Ok(())
    }
}

/// Map a SELECT row (CONFIG_SELECT column order) to a BroadcastConfig.
fn row_to_config(row: &rusqlite::Row<'_>) -> rusqlite::Result<BroadcastConfig> {
    Ok(BroadcastConfig {
        id: row.get(0)?,
        owner_email: row.get(1)?,
        name: row.get(2)?,
        token: row.get(3)?,
        message: row.get(4)?,
        channel_ids: split_list(&row.get::<_, String>(5)?),
        delay_seconds: row.get(6)?,
        image_urls: split_list(&row.get::<_, String>(7)?),
        created_at: row.get(8)?,
    })
}

// Channel ids and image urls are stored comma-joined, matching the wire
// format the dashboard round-trips.
fn join_list(items: &[String]) -> String {
    items.join(",")
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConfigStore {
        ConfigStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn sample(name: &str) -> NewBroadcastConfig {
        NewBroadcastConfig {
            name: name.to_string(),
            token: "tok".into(),
            message: "hello".into(),
            channel_ids: vec!["111".into(), "222".into()],
            delay_seconds: 30,
            image_urls: vec![],
        }
    }

    #[test]
    fn save_and_get_round_trip() {
        let store = store();
        let saved = store.save("a@example.com", sample("first")).unwrap();
        assert!(saved.id > 0);
        assert_eq!(saved.owner_email, "a@example.com");
        assert_eq!(saved.channel_ids, vec!["111", "222"]);

        let fetched = store.get(saved.id).unwrap().unwrap();
        assert_eq!(fetched.name, "first");
        assert_eq!(fetched.delay_seconds, 30);
        assert!(fetched.image_urls.is_empty());
    }

    #[test]
    fn list_is_owner_scoped_and_newest_first() {
        let store = store();
        store.save("a@example.com", sample("one")).unwrap();
        store.save("b@example.com", sample("other")).unwrap();
        store.save("a@example.com", sample("two")).unwrap();

        let configs = store.list("a@example.com").unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].name, "two");
        assert_eq!(configs[1].name, "one");
    }

    #[test]
    fn get_missing_is_none() {
        assert!(store().get(42).unwrap().is_none());
    }

    #[test]
    fn delete_removes_the_row() {
        let store = store();
        let saved = store.save("a@example.com", sample("gone")).unwrap();
        store.delete(saved.id).unwrap();
        assert!(store.get(saved.id).unwrap().is_none());
        assert!(matches!(
            store.delete(saved.id),
            Err(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn split_list_drops_empty_segments() {
        assert_eq!(split_list("111, 222 ,,333"), vec!["111", "222", "333"]);
        assert!(split_list("").is_empty());
    }
}
