//! Type generation
//!
//! This module turns introspected metadata into TypeScript declaration
//! fragments. Fragments are plain strings that the assembler concatenates.

use crate::prelude::{ColumnDescriptor, EnumMap, SchematsError};

pub mod typescript;

pub use typescript::TypeScriptGenerator;

/// Options for generated declarations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// PascalCase table type names and camelCase column names
    pub camel_case: bool,
    /// Mark nullable columns as optional interface members
    pub optional_nullable: bool,
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camel_case(mut self, camel_case: bool) -> Self {
        self.camel_case = camel_case;
        self
    }

    pub fn with_optional_nullable(mut self, optional_nullable: bool) -> Self {
        self.optional_nullable = optional_nullable;
        self
    }
}

/// Trait for producing declaration fragments
pub trait FragmentGenerator {
    /// One union type declaration per enum, in map order
    fn enum_types(&self, enums: &EnumMap) -> Result<String, SchematsError>;

    /// Column name to type aliases for a table
    fn table_types(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        enums: &EnumMap,
    ) -> Result<String, SchematsError>;

    /// Interface declaration for a table
    ///
    /// `None` when the generator has no interface to emit for the table.
    fn table_interface(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        enums: &EnumMap,
    ) -> Result<Option<String>, SchematsError>;
}
