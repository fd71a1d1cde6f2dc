// Library for the recipe CSV import.
// Staging load, normalization and reporting all run inside one transaction.

pub mod config;
pub mod db;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod staging;
pub mod tokens;

pub use config::{Settings, Sources};
pub use db::Database;
pub use error::{ImportError, StoreResult};
