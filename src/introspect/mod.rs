//! Database introspection
//!
//! This module provides the metadata queries the generator needs. Each
//! supported database has its own feature-gated submodule.

use crate::prelude::{ColumnDescriptor, EnumMap, SchematsError};

/// Schema used when none is requested
pub const DEFAULT_SCHEMA: &str = "public";

/// Trait for database metadata readers
pub trait SchemaReader {
    /// List table names in a schema
    fn list_tables(&mut self, schema: &str) -> Result<Vec<String>, SchematsError>;

    /// Enum types declared in a schema with their members
    fn enum_types(&mut self, schema: &str) -> Result<EnumMap, SchematsError>;

    /// Columns of a table, in declaration order
    fn table_columns(
        &mut self,
        table: &str,
        schema: &str,
    ) -> Result<Vec<ColumnDescriptor>, SchematsError>;
}

pub mod catalog;

// Feature-gated database implementations
#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresReader;

#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "mysql")]
pub use mysql::MysqlReader;
