//! Core CorpusStore struct and constructors

use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

use crate::error::SearchError;
use crate::store::schema::SCHEMA_SQL;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on a SQLite corpus database.
///
/// A store opened with [`CorpusStore::open_read_only`] serves searches only;
/// the loader opens the same file read-write. The database runs in WAL mode so
/// one writer and many readers can work on it at the same time.
pub struct CorpusStore {
    pub(crate) conn: Connection,
    pub(crate) read_only: bool,
}

impl CorpusStore {
    /// Open (or create) a corpus database for reading and writing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SearchError> {
        let conn = Connection::open(path.as_ref())?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("Opened corpus store {} (journal_mode={})", path.as_ref().display(), mode);
        Self::initialize(conn, false)
    }

    /// Open an existing corpus database for searching only
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, SearchError> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        log::debug!("Opened corpus store {} in READ-ONLY mode", path.as_ref().display());
        Ok(Self {
            conn,
            read_only: true,
        })
    }

    /// Fresh in-memory store with the schema installed
    pub fn open_in_memory() -> Result<Self, SearchError> {
        Self::initialize(Connection::open_in_memory()?, false)
    }

    fn initialize(conn: Connection, read_only: bool) -> Result<Self, SearchError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn, read_only })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Raw connection, for ad-hoc inspection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
