use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Row;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, error, trace};

use super::catalog;
use super::{SchemaReader, DEFAULT_SCHEMA};
use crate::prelude::SchematsError;
use crate::schema::{ColumnDescriptor, EnumMap};

/// MySQL schema reader
///
/// MySQL calls a schema a database; the default schema resolves to the
/// database named in the connection URI.
pub struct MysqlReader {
    runtime: Runtime,
    pool: MySqlPool,
    database: String,
}

impl MysqlReader {
    pub fn connect(uri: &str) -> Result<Self, SchematsError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SchematsError::Connection(format!("Failed to start runtime: {}", e)))?;

        let pool = runtime
            .block_on(
                MySqlPoolOptions::new()
                    .max_connections(1)
                    .acquire_timeout(Duration::from_secs(10))
                    .connect(uri),
            )
            .map_err(|e| {
                error!(error = ?e, "Failed to connect to MySQL");
                SchematsError::Connection(e.to_string())
            })?;

        let database = runtime
            .block_on(
                sqlx::query_scalar::<_, Option<String>>("SELECT CAST(DATABASE() AS CHAR)")
                    .fetch_one(&pool),
            )
            .map_err(|e| SchematsError::Connection(e.to_string()))?
            .ok_or_else(|| {
                SchematsError::Config("MySQL connection URI must name a database".to_string())
            })?;

        debug!(database = ?database, "Connected to MySQL");
        Ok(Self {
            runtime,
            pool,
            database,
        })
    }

    fn schema_name<'a>(&'a self, schema: &'a str) -> &'a str {
        if schema == DEFAULT_SCHEMA {
            &self.database
        } else {
            schema
        }
    }
}

impl SchemaReader for MysqlReader {
    fn list_tables(&mut self, schema: &str) -> Result<Vec<String>, SchematsError> {
        let schema = self.schema_name(schema);
        self.runtime.block_on(query_tables(&self.pool, schema))
    }

    fn enum_types(&mut self, schema: &str) -> Result<EnumMap, SchematsError> {
        let schema = self.schema_name(schema);
        self.runtime.block_on(query_enums(&self.pool, schema))
    }

    fn table_columns(
        &mut self,
        table: &str,
        schema: &str,
    ) -> Result<Vec<ColumnDescriptor>, SchematsError> {
        let schema = self.schema_name(schema);
        self.runtime.block_on(query_columns(&self.pool, schema, table))
    }
}

fn introspection_error(schema_name: &str, what: &str, e: sqlx::Error) -> SchematsError {
    error!(schema = ?schema_name, error = ?e, "Failed to query {}", what);
    SchematsError::Introspection {
        schema: schema_name.to_string(),
        message: format!("Failed to query {}: {}", what, e),
    }
}

/// Query all table and view names in a schema
async fn query_tables(pool: &MySqlPool, schema_name: &str) -> Result<Vec<String>, SchematsError> {
    trace!(schema = ?schema_name, "Querying tables");

    let sql = r#"
        SELECT CAST(table_name AS CHAR) AS table_name
        FROM information_schema.tables
        WHERE table_schema = ?
        ORDER BY table_name
    "#;

    let rows = sqlx::query(sql)
        .bind(schema_name)
        .fetch_all(pool)
        .await
        .map_err(|e| introspection_error(schema_name, "tables", e))?;

    let tables = rows
        .iter()
        .map(|row| row.try_get::<String, _>("table_name"))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| introspection_error(schema_name, "tables", e))?;

    debug!(schema = ?schema_name, count = ?tables.len(), "Found tables");
    Ok(tables)
}

/// Query `enum` and `set` columns, one enum per column
async fn query_enums(pool: &MySqlPool, schema_name: &str) -> Result<EnumMap, SchematsError> {
    trace!(schema = ?schema_name, "Querying enum columns");

    let sql = r#"
        SELECT
            CAST(column_name AS CHAR) AS column_name,
            CAST(data_type AS CHAR) AS data_type,
            CAST(column_type AS CHAR) AS column_type
        FROM information_schema.columns
        WHERE data_type IN ('enum', 'set')
            AND table_schema = ?
        ORDER BY table_name, ordinal_position
    "#;

    let rows = sqlx::query(sql)
        .bind(schema_name)
        .fetch_all(pool)
        .await
        .map_err(|e| introspection_error(schema_name, "enums", e))?;

    let mut enums = EnumMap::new();
    for row in rows {
        let column_name: String = row
            .try_get("column_name")
            .map_err(|e| introspection_error(schema_name, "enums", e))?;
        let data_type: String = row
            .try_get("data_type")
            .map_err(|e| introspection_error(schema_name, "enums", e))?;
        let column_type: String = row
            .try_get("column_type")
            .map_err(|e| introspection_error(schema_name, "enums", e))?;

        let values = catalog::parse_enum_values(&column_type);
        trace!(column = ?column_name, values = ?values, "Enum column");
        enums.insert(catalog::mysql_enum_name(&data_type, &column_name), values);
    }

    Ok(enums)
}

/// Query all columns for a table
async fn query_columns(
    pool: &MySqlPool,
    schema_name: &str,
    table_name: &str,
) -> Result<Vec<ColumnDescriptor>, SchematsError> {
    trace!(schema = ?schema_name, table = ?table_name, "Querying columns");

    let sql = r#"
        SELECT
            CAST(column_name AS CHAR) AS column_name,
            CAST(data_type AS CHAR) AS data_type,
            CAST(is_nullable AS CHAR) AS is_nullable
        FROM information_schema.columns
        WHERE table_name = ?
            AND table_schema = ?
        ORDER BY ordinal_position
    "#;

    let what = format!("columns for table '{}'", table_name);
    let rows = sqlx::query(sql)
        .bind(table_name)
        .bind(schema_name)
        .fetch_all(pool)
        .await
        .map_err(|e| introspection_error(schema_name, &what, e))?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row
            .try_get("column_name")
            .map_err(|e| introspection_error(schema_name, &what, e))?;
        let data_type: String = row
            .try_get("data_type")
            .map_err(|e| introspection_error(schema_name, &what, e))?;
        let is_nullable: String = row
            .try_get("is_nullable")
            .map_err(|e| introspection_error(schema_name, &what, e))?;

        let column = catalog::mysql_column(name, data_type, &is_nullable);
        trace!(
            column = ?column.name,
            data_type = ?column.database_type,
            is_nullable = ?column.is_nullable,
            "Parsed column"
        );
        columns.push(column);
    }

    Ok(columns)
}
