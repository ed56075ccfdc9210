//! Database type to TypeScript type mapping

use tracing::warn;

use crate::schema::{enum_type_name, ColumnDescriptor, EnumMap};

/// Fallback for types with no known mapping
const FALLBACK_TYPE: &str = "any";

/// Resolve the TypeScript type expression for a column
///
/// Enum lookups take precedence over the native type. Array wrapping is
/// applied first and nullability wraps the whole result, so a nullable array
/// column becomes `Array<T> | null`.
pub fn map_type(column: &ColumnDescriptor, enums: &EnumMap) -> String {
    let base = if enums.contains_key(&column.udt_name) {
        enum_type_name(&column.udt_name)
    } else {
        match base_type(&column.database_type) {
            Some(ts_type) => ts_type.to_string(),
            None => {
                warn!(
                    column = ?column.name,
                    data_type = ?column.database_type,
                    "Type has been mapped to any because no specific type has been found"
                );
                FALLBACK_TYPE.to_string()
            }
        }
    };

    let ts_type = if column.is_array {
        format!("Array<{}>", base)
    } else {
        base
    };

    if column.is_nullable {
        format!("{} | null", ts_type)
    } else {
        ts_type
    }
}

/// Map a native type name (SQL spelling, PostgreSQL udt alias or MySQL type)
fn base_type(type_str: &str) -> Option<&'static str> {
    let lower = type_str.to_lowercase();
    // Drop modifiers such as "varchar(255)" or "numeric(10,2)"
    let trimmed = match lower.find('(') {
        Some(start) => {
            let end = lower.find(')').map_or(lower.len(), |end| end + 1);
            format!("{}{}", &lower[..start], &lower[end..])
        }
        None => lower,
    };
    let trimmed = trimmed.trim();

    let ts_type = match trimmed {
        "bpchar" | "char" | "character" | "varchar" | "character varying" | "text"
        | "tinytext" | "mediumtext" | "longtext" | "citext" | "uuid" | "bytea" | "inet"
        | "cidr" | "macaddr" | "time" | "timetz" | "time without time zone"
        | "time with time zone" | "interval" | "name" | "xml" | "tsvector" | "geometry"
        | "enum" | "set" => "string",
        "int2" | "int4" | "int8" | "smallint" | "mediumint" | "integer" | "int" | "bigint"
        | "float4" | "float8" | "float" | "double" | "real" | "double precision" | "numeric"
        | "decimal" | "money" | "oid" | "year" | "smallserial" | "serial" | "bigserial" => {
            "number"
        }
        "bool" | "boolean" | "tinyint" => "boolean",
        "json" | "jsonb" => "Object",
        "date" | "datetime" | "timestamp" | "timestamptz" | "timestamp without time zone"
        | "timestamp with time zone" => "Date",
        "tinyblob" | "blob" | "mediumblob" | "longblob" | "binary" | "varbinary" | "bit" => {
            "Buffer"
        }
        _ => return None,
    };

    Some(ts_type)
}
