use super::{ChoreRecord, ChoreStore, WorkerStore};
use crate::error::{StoreError, StoreResult};
use crate::worker::Worker;
use rusqlite::{Connection, params};
use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

/// A collection stored as rows of JSON records in one SQLite table.
pub struct SqliteStore {
    connection: Connection,
    table: String,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and the table `name`.
    pub fn open<P: AsRef<Path>>(path: P, name: &str) -> StoreResult<Self> {
        let connection = Connection::open(path)?;
        Self::with_connection(connection, name)
    }

    pub fn in_memory(name: &str) -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, name)
    }

    fn with_connection(connection: Connection, name: &str) -> StoreResult<Self> {
        let table = Self::table_name(name)?;
        Self::initialize_schema(&connection, &table)?;
        Ok(Self { connection, table })
    }

    fn table_name(name: &str) -> StoreResult<String> {
        let valid = !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if valid {
            Ok(name.to_string())
        } else {
            Err(StoreError::InvalidData(format!(
                "'{name}' is not usable as a table name"
            )))
        }
    }

    fn initialize_schema(connection: &Connection, table: &str) -> StoreResult<()> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                position INTEGER PRIMARY KEY,
                id TEXT NOT NULL,
                record_json TEXT NOT NULL
            );"
        );
        connection.execute_batch(&ddl)?;
        Ok(())
    }

    fn read_all<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        let mut stmt = self.connection.prepare(&format!(
            "SELECT record_json FROM {} ORDER BY position ASC",
            self.table
        ))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut items = Vec::new();
        for json in rows {
            items.push(serde_json::from_str(&json?)?);
        }
        Ok(items)
    }

    fn write_all<T: Serialize>(&self, items: &[T], id_of: impl Fn(&T) -> String) -> StoreResult<()> {
        let tx = self.connection.unchecked_transaction()?;
        tx.execute(&format!("DELETE FROM {}", self.table), [])?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (position, id, record_json) VALUES (?1, ?2, ?3)",
                self.table
            ))?;
            for (position, item) in items.iter().enumerate() {
                let json = serde_json::to_string(item)?;
                stmt.execute(params![position as i64, id_of(item), json])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl ChoreStore for SqliteStore {
    fn load_chores(&self) -> StoreResult<Vec<ChoreRecord>> {
        self.read_all()
    }

    fn save_chores(&self, chores: &[ChoreRecord]) -> StoreResult<()> {
        self.write_all(chores, |chore| chore.id.to_string())
    }
}

impl WorkerStore for SqliteStore {
    fn load_workers(&self) -> StoreResult<Vec<Worker>> {
        self.read_all()
    }

    fn save_workers(&self, workers: &[Worker]) -> StoreResult<()> {
        self.write_all(workers, |worker| worker.id().to_string())
    }
}
