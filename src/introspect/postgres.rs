use postgres::Client;
use tracing::{debug, error, trace};

use super::catalog::{self, CatalogType};
use super::SchemaReader;
use crate::prelude::SchematsError;
use crate::schema::{ColumnDescriptor, EnumMap};

/// PostgreSQL schema reader
pub struct PostgresReader<'a> {
    client: &'a mut Client,
}

impl<'a> PostgresReader<'a> {
    pub fn new(client: &'a mut Client) -> Self {
        Self { client }
    }
}

impl SchemaReader for PostgresReader<'_> {
    fn list_tables(&mut self, schema: &str) -> Result<Vec<String>, SchematsError> {
        query_tables(self.client, schema)
    }

    fn enum_types(&mut self, schema: &str) -> Result<EnumMap, SchematsError> {
        query_enums(self.client, schema)
    }

    fn table_columns(
        &mut self,
        table: &str,
        schema: &str,
    ) -> Result<Vec<ColumnDescriptor>, SchematsError> {
        query_columns(self.client, schema, table)
    }
}

/// Query all table and view names in a schema
fn query_tables(client: &mut Client, schema_name: &str) -> Result<Vec<String>, SchematsError> {
    trace!(schema = ?schema_name, "Querying tables");

    let sql = r#"
        SELECT c.relname AS table_name
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind IN ('r', 'p', 'v', 'm')
            AND n.nspname = $1
        ORDER BY c.relname
    "#;

    let rows = client.query(sql, &[&schema_name]).map_err(|e| {
        error!(schema = ?schema_name, error = ?e, "Failed to query tables");
        SchematsError::Introspection {
            schema: schema_name.to_string(),
            message: format!("Failed to query tables: {}", e),
        }
    })?;

    let tables: Vec<String> = rows.iter().map(|row| row.get("table_name")).collect();
    debug!(schema = ?schema_name, count = ?tables.len(), "Found tables");
    Ok(tables)
}

/// Query all columns for a table
///
/// Array columns report their element type in `udt_name` and `data_type`.
/// Domains (and arrays of domains) are reported as their base type.
fn query_columns(
    client: &mut Client,
    schema_name: &str,
    table_name: &str,
) -> Result<Vec<ColumnDescriptor>, SchematsError> {
    trace!(schema = ?schema_name, table = ?table_name, "Querying columns");

    let sql = r#"
        SELECT
            a.attname AS column_name,
            NOT a.attnotnull AS is_nullable,
            t.typname AS type_name,
            format_type(t.oid, NULL) AS type_format,
            bt.typname AS base_name,
            format_type(bt.oid, NULL) AS base_format,
            et.typname AS element_name,
            format_type(et.oid, NULL) AS element_format,
            ebt.typname AS element_base_name,
            format_type(ebt.oid, NULL) AS element_base_format
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_type t ON t.oid = a.atttypid
        LEFT JOIN pg_type bt ON bt.oid = t.typbasetype AND t.typtype = 'd'
        LEFT JOIN pg_type et ON et.oid = COALESCE(bt.typelem, t.typelem)
            AND COALESCE(bt.typcategory, t.typcategory) = 'A'
        LEFT JOIN pg_type ebt ON ebt.oid = et.typbasetype AND et.typtype = 'd'
        WHERE c.relname = $1
            AND n.nspname = $2
            AND a.attnum > 0
            AND NOT a.attisdropped
        ORDER BY a.attnum
    "#;

    let rows = client
        .query(sql, &[&table_name, &schema_name])
        .map_err(|e| {
            error!(
                schema = ?schema_name,
                table = ?table_name,
                error = ?e,
                "Failed to query columns"
            );
            SchematsError::Introspection {
                schema: schema_name.to_string(),
                message: format!("Failed to query columns for table '{}': {}", table_name, e),
            }
        })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let mut column_type = CatalogType::new(
            row.get::<_, String>("type_name"),
            row.get::<_, String>("type_format"),
        );
        column_type.base_name = row.get("base_name");
        column_type.base_format = row.get("base_format");

        let element = row
            .get::<_, Option<String>>("element_name")
            .map(|element_name| CatalogType {
                format: row
                    .get::<_, Option<String>>("element_format")
                    .unwrap_or_else(|| element_name.clone()),
                name: element_name,
                base_name: row.get("element_base_name"),
                base_format: row.get("element_base_format"),
            });

        let column = catalog::postgres_column(
            row.get("column_name"),
            row.get("is_nullable"),
            column_type,
            element,
        );

        trace!(
            column = ?column.name,
            data_type = ?column.database_type,
            udt_name = ?column.udt_name,
            is_nullable = ?column.is_nullable,
            is_array = ?column.is_array,
            "Parsed column"
        );

        columns.push(column);
    }

    Ok(columns)
}

/// Query all enum types in a schema
fn query_enums(client: &mut Client, schema_name: &str) -> Result<EnumMap, SchematsError> {
    trace!(schema = ?schema_name, "Querying enum types");

    let sql = r#"
        SELECT
            t.typname AS enum_name,
            e.enumlabel AS enum_value
        FROM pg_type t
        JOIN pg_enum e ON e.enumtypid = t.oid
        JOIN pg_namespace n ON n.oid = t.typnamespace
        WHERE n.nspname = $1
        ORDER BY t.oid, e.enumsortorder
    "#;

    let rows = client.query(sql, &[&schema_name]).map_err(|e| {
        error!(schema = ?schema_name, error = ?e, "Failed to query enum types");
        SchematsError::Introspection {
            schema: schema_name.to_string(),
            message: format!("Failed to query enums: {}", e),
        }
    })?;

    // Grouped in catalog (creation) order
    let enums = catalog::group_enum_rows(rows.iter().map(|row| {
        (
            row.get::<_, String>("enum_name"),
            row.get::<_, String>("enum_value"),
        )
    }));

    for (name, values) in &enums {
        trace!(name = ?name, values = ?values, "Enum type");
    }

    Ok(enums)
}
