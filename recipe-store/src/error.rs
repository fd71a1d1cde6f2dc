use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No database driver available for scheme '{scheme}' (only sqlite is compiled in)")]
    DriverUnavailable { scheme: String },

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to execute SQL for {context}: {source}")]
    Statement {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("No CSV path configured for {table}")]
    MissingSourcePath { table: &'static str },

    #[error("Failed to read CSV {} for {table}: {source}", path.display())]
    Csv {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV header for {table} has {found} columns, expected {expected}")]
    ColumnMismatch {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid value for {table}.{column} on line {line}: {reason}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        line: u64,
        reason: String,
    },
}

impl ImportError {
    /// Wrap a SQL failure with the statement it came from
    pub fn statement(context: impl Into<String>, source: rusqlite::Error) -> Self {
        ImportError::Statement {
            context: context.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, ImportError>;
