//! Local photon index
//!
//! SQLite-backed list of photons downloaded to this machine.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, trace};

use crate::error::Result;
use crate::paths;

/// A photon file on disk, as recorded in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPhoton {
    pub id: String,
    pub name: String,
    pub model: String,
    pub path: PathBuf,
    /// Seconds since the epoch
    pub creation_time: i64,
}

pub struct LocalPhotonDb {
    conn: Connection,
}

impl LocalPhotonDb {
    /// Open the index at `<cache>/lepton.db`, creating it if necessary.
    pub fn open_default() -> Result<Self> {
        Self::open(&paths::photon_db_path())
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS photon (
                id TEXT,
                name TEXT,
                model TEXT,
                path TEXT,
                creation_time INTEGER
            );
            "#,
        )?;
        Ok(())
    }

    /// Record a photon file, stamped with the current time.
    pub fn add(&self, id: &str, name: &str, model: &str, path: &Path) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO photon (id, name, model, path, creation_time) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, model, path.to_string_lossy(), now],
        )?;
        debug!(id, name, path = %path.display(), "recorded local photon");
        Ok(())
    }

    /// Every indexed photon, newest first.
    pub fn list(&self) -> Result<Vec<LocalPhoton>> {
        self.query(
            "SELECT id, name, model, path, creation_time FROM photon
             ORDER BY creation_time DESC, rowid DESC",
            &[],
        )
    }

    /// Newest photon called `name`.
    pub fn find(&self, name: &str) -> Result<Option<LocalPhoton>> {
        let mut found = self.query(
            "SELECT id, name, model, path, creation_time FROM photon WHERE name = ?1
             ORDER BY creation_time DESC, rowid DESC LIMIT 1",
            &[&name],
        )?;
        Ok(found.pop())
    }

    /// Delete the newest photon called `name`, or all of them with
    /// `remove_all`. Files are removed along with their rows. Returns the
    /// photons removed; an unknown name removes nothing.
    pub fn remove(&self, name: &str, remove_all: bool) -> Result<Vec<LocalPhoton>> {
        let targets = if remove_all {
            self.query(
                "SELECT id, name, model, path, creation_time FROM photon WHERE name = ?1",
                &[&name],
            )?
        } else {
            self.find(name)?.into_iter().collect()
        };

        for photon in &targets {
            remove_file_if_exists(&photon.path)?;
            self.conn.execute(
                "DELETE FROM photon WHERE name = ?1 AND path = ?2",
                params![photon.name, photon.path.to_string_lossy()],
            )?;
        }
        Ok(targets)
    }

    fn query(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<LocalPhoton>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            let path: String = row.get(3)?;
            Ok(LocalPhoton {
                id: row.get(0)?,
                name: row.get(1)?,
                model: row.get(2)?,
                path: PathBuf::from(path),
                creation_time: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            trace!(path = %path.display(), "local photon file already gone");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn db_with_files(dir: &TempDir, entries: &[(&str, &str)]) -> LocalPhotonDb {
        let db = LocalPhotonDb::open(&dir.path().join("lepton.db")).unwrap();
        for (id, name) in entries {
            let path = dir.path().join(format!("{name}.{id}.photon"));
            fs::write(&path, b"zip").unwrap();
            db.add(id, name, "hf:gpt2", &path).unwrap();
        }
        db
    }

    #[test]
    fn test_list_newest_first() {
        let dir = TempDir::new().unwrap();
        let db = db_with_files(&dir, &[("a1", "alpha"), ("b1", "beta"), ("a2", "alpha")]);

        let ids: Vec<String> = db.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a2", "b1", "a1"]);
        assert_eq!(db.find("alpha").unwrap().unwrap().id, "a2");
        assert!(db.find("gamma").unwrap().is_none());
    }

    #[test]
    fn test_remove_newest_only() {
        let dir = TempDir::new().unwrap();
        let db = db_with_files(&dir, &[("a1", "alpha"), ("a2", "alpha")]);

        let removed = db.remove("alpha", false).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, "a2");
        assert!(!removed[0].path.exists());
        assert!(dir.path().join("alpha.a1.photon").exists());
        assert_eq!(db.find("alpha").unwrap().unwrap().id, "a1");
    }

    #[test]
    fn test_remove_all_and_unknown() {
        let dir = TempDir::new().unwrap();
        let db = db_with_files(&dir, &[("a1", "alpha"), ("a2", "alpha"), ("b1", "beta")]);

        assert_eq!(db.remove("alpha", true).unwrap().len(), 2);
        assert!(db.remove("gamma", true).unwrap().is_empty());
        let names: Vec<String> = db.list().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["beta"]);
    }

    #[test]
    fn test_remove_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let db = db_with_files(&dir, &[("a1", "alpha")]);
        fs::remove_file(dir.path().join("alpha.a1.photon")).unwrap();

        assert_eq!(db.remove("alpha", false).unwrap().len(), 1);
        assert!(db.list().unwrap().is_empty());
    }
}
