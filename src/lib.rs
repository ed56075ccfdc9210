//! # schemats
//!
//! Generate TypeScript type definitions from database schemas
//!
//! This crate provides a CLI tool and library for introspecting database
//! tables and enums and emitting matching TypeScript declarations.

pub mod assemble;
pub mod codegen;
pub mod command;
pub mod config;
pub mod error;
pub mod introspect;
pub mod output;
pub mod schema;

pub mod prelude {
    pub use crate::assemble::{assemble_schema, SchemaRequest};
    pub use crate::codegen::{FragmentGenerator, GeneratorOptions, TypeScriptGenerator};
    pub use crate::config::{ConnectionConfig, Database};
    pub use crate::error::SchematsError;
    pub use crate::introspect::{SchemaReader, DEFAULT_SCHEMA};
    pub use crate::schema::{ColumnDescriptor, EnumMap};
}

#[cfg(feature = "postgres")]
pub use introspect::PostgresReader;

#[cfg(feature = "mysql")]
pub use introspect::MysqlReader;
