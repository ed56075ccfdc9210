//! TypeScript type generator
//!
//! Renders enum unions, per-table field type namespaces and per-table
//! interfaces.

use minijinja::{AutoEscape, Environment};
use tracing::debug;

use crate::codegen::{FragmentGenerator, GeneratorOptions};
use crate::error::SchematsError;
use crate::schema::{
    enum_type_name, is_identifier, to_camel_case, to_identifier, to_pascal_case,
    ColumnDescriptor, EnumMap,
};

mod types;

pub use types::map_type;

/// TypeScript type generator
pub struct TypeScriptGenerator {
    env: Environment<'static>,
    options: GeneratorOptions,
}

impl TypeScriptGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        // Register templates
        env.add_template("enums", include_str!("templates/enums.ts.jinja"))
            .expect("Failed to load enums template");
        env.add_template("table_types", include_str!("templates/table_types.ts.jinja"))
            .expect("Failed to load table types template");
        env.add_template(
            "table_interface",
            include_str!("templates/table_interface.ts.jinja"),
        )
        .expect("Failed to load table interface template");

        Self { env, options }
    }

    /// Type name used for a table's declarations
    fn type_name(&self, table: &str) -> String {
        if self.options.camel_case {
            to_identifier(&to_pascal_case(table))
        } else {
            to_identifier(table)
        }
    }

    /// Member name used for a column
    fn field_name(&self, column: &str) -> String {
        if self.options.camel_case {
            to_identifier(&to_camel_case(column))
        } else {
            to_identifier(column)
        }
    }

    /// Interface property for a column, quoted when not a valid identifier
    fn property_name(&self, column: &str) -> String {
        let name = if self.options.camel_case {
            to_camel_case(column)
        } else {
            column.to_string()
        };

        if is_identifier(&name) {
            name
        } else {
            quote_literal(&name)
        }
    }

    fn render(
        &self,
        template_name: &str,
        table: &str,
        ctx: minijinja::Value,
    ) -> Result<String, SchematsError> {
        let template = self
            .env
            .get_template(template_name)
            .map_err(|e| SchematsError::CodeGen {
                table: table.to_string(),
                message: format!("Template error: {}", e),
            })?;

        template.render(ctx).map_err(|e| SchematsError::CodeGen {
            table: table.to_string(),
            message: format!("Render error: {}", e),
        })
    }

    /// Build template context for a table's columns
    fn build_fields_context(
        &self,
        columns: &[ColumnDescriptor],
        enums: &EnumMap,
    ) -> Vec<minijinja::Value> {
        columns
            .iter()
            .map(|col| {
                minijinja::context! {
                    name => self.field_name(&col.name),
                    property => self.property_name(&col.name),
                    ts_type => map_type(col, enums),
                    optional => self.options.optional_nullable && col.is_nullable,
                }
            })
            .collect()
    }
}

impl Default for TypeScriptGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

impl FragmentGenerator for TypeScriptGenerator {
    fn enum_types(&self, enums: &EnumMap) -> Result<String, SchematsError> {
        let ctx = minijinja::context! {
            enums => enums.iter().map(|(name, values)| {
                minijinja::context! {
                    name => enum_type_name(name),
                    union => union_of_literals(values),
                }
            }).collect::<Vec<_>>(),
        };

        self.render("enums", "enums", ctx)
    }

    fn table_types(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        enums: &EnumMap,
    ) -> Result<String, SchematsError> {
        debug!(table = ?table, columns = columns.len(), "Generating table types");

        let ctx = minijinja::context! {
            type_name => self.type_name(table),
            fields => self.build_fields_context(columns, enums),
        };

        self.render("table_types", table, ctx)
    }

    fn table_interface(
        &self,
        table: &str,
        columns: &[ColumnDescriptor],
        enums: &EnumMap,
    ) -> Result<Option<String>, SchematsError> {
        debug!(table = ?table, columns = columns.len(), "Generating table interface");

        let ctx = minijinja::context! {
            type_name => self.type_name(table),
            fields => self.build_fields_context(columns, enums),
        };

        self.render("table_interface", table, ctx).map(Some)
    }
}

/// Quoted member literals joined as a union, `never` for an empty enum
fn union_of_literals(values: &[String]) -> String {
    if values.is_empty() {
        return "never".to_string();
    }

    values
        .iter()
        .map(|v| quote_literal(v))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Single-quoted TypeScript string literal
fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}
