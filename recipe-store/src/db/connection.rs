use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};

use crate::error::{ImportError, StoreResult};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

const SQLITE_SCHEME: &str = "sqlite:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Where a database URL points once its driver has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Resolve a database URL.
    ///
    /// Accepts a plain path, `sqlite://<path>`, `sqlite:<path>`,
    /// `sqlite::memory:` and `:memory:`. Any other `<scheme>://` names a
    /// driver this build does not have.
    pub fn parse(url: &str) -> StoreResult<Self> {
        let trimmed = url.trim();

        let rest = match strip_prefix_ignore_case(trimmed, SQLITE_SCHEME) {
            Some(rest) => rest.strip_prefix("//").unwrap_or(rest),
            None => {
                if let Some((scheme, _)) = trimmed.split_once("://") {
                    return Err(ImportError::DriverUnavailable {
                        scheme: scheme.to_string(),
                    });
                }
                trimmed
            }
        };

        if rest.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            Ok(DatabaseTarget::Memory)
        } else {
            Ok(DatabaseTarget::File(PathBuf::from(rest)))
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Open the database named by a URL. Fails before any connection is
    /// attempted when the URL needs a driver that is not compiled in.
    pub fn open(url: &str) -> StoreResult<Self> {
        match DatabaseTarget::parse(url)? {
            DatabaseTarget::Memory => Self::in_memory(),
            DatabaseTarget::File(path) => Self::new(path),
        }
    }

    /// Create a new database connection pool on a file
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let manager = Self::configure(SqliteConnectionManager::file(path));
        let pool = Pool::new(manager)?;
        Ok(Self { pool })
    }

    /// Create an in-memory database.
    ///
    /// Every connection to `:memory:` is its own database, so the pool is
    /// limited to one connection.
    pub fn in_memory() -> StoreResult<Self> {
        let manager = Self::configure(SqliteConnectionManager::memory());
        let pool = Pool::builder().max_size(1).build(manager)?;
        Ok(Self { pool })
    }

    /// Foreign keys are off by default in SQLite and cannot be switched on
    /// inside a transaction, so every new connection enables them.
    fn configure(manager: SqliteConnectionManager) -> SqliteConnectionManager {
        manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> StoreResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
