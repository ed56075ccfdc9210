//! Catalog row interpretation
//!
//! Turns raw metadata rows into descriptors. Kept free of database clients so
//! every backend shares (and tests) the same rules.

use crate::schema::{ColumnDescriptor, EnumMap};

/// A PostgreSQL type as read from `pg_type`, with its domain base if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogType {
    /// `typname`
    pub name: String,
    /// `format_type` output
    pub format: String,
    /// Base `typname` when this type is a domain
    pub base_name: Option<String>,
    /// Base `format_type` output when this type is a domain
    pub base_format: Option<String>,
}

impl CatalogType {
    pub fn new(name: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format: format.into(),
            base_name: None,
            base_format: None,
        }
    }

    pub fn domain_of(
        mut self,
        base_name: impl Into<String>,
        base_format: impl Into<String>,
    ) -> Self {
        self.base_name = Some(base_name.into());
        self.base_format = Some(base_format.into());
        self
    }

    /// `(udt_name, data_type)` with domains replaced by their base type
    fn resolve(self) -> (String, String) {
        match self.base_name {
            Some(base_name) => {
                let base_format = self.base_format.unwrap_or_else(|| base_name.clone());
                (base_name, base_format)
            }
            None => (self.name, self.format),
        }
    }
}

/// Build a descriptor for a PostgreSQL column
///
/// `element` is the array element type when the column (or the domain it is
/// declared with) is an array.
pub fn postgres_column(
    name: String,
    is_nullable: bool,
    column_type: CatalogType,
    element: Option<CatalogType>,
) -> ColumnDescriptor {
    let is_array = element.is_some();
    let (udt_name, database_type) = element.unwrap_or(column_type).resolve();

    ColumnDescriptor {
        name,
        database_type,
        is_nullable,
        is_array,
        udt_name,
    }
}

/// Group `(enum name, member)` rows, keeping first-seen enum order
pub fn group_enum_rows<I>(rows: I) -> EnumMap
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut enums = EnumMap::new();
    for (enum_name, enum_value) in rows {
        enums.entry(enum_name).or_default().push(enum_value);
    }
    enums
}

/// Enum name for a MySQL `enum`/`set` column, which has no named type
pub fn mysql_enum_name(data_type: &str, column_name: &str) -> String {
    format!("{}_{}", data_type.to_lowercase(), column_name)
}

fn is_mysql_enum(data_type: &str) -> bool {
    data_type.eq_ignore_ascii_case("enum") || data_type.eq_ignore_ascii_case("set")
}

/// Build a descriptor for a MySQL column from `information_schema.columns`
pub fn mysql_column(name: String, data_type: String, is_nullable: &str) -> ColumnDescriptor {
    let udt_name = if is_mysql_enum(&data_type) {
        mysql_enum_name(&data_type, &name)
    } else {
        data_type.clone()
    };

    ColumnDescriptor {
        name,
        database_type: data_type,
        is_nullable: is_nullable.eq_ignore_ascii_case("YES"),
        is_array: false,
        udt_name,
    }
}

/// Members of a MySQL `COLUMN_TYPE` such as `enum('a','b')`
pub fn parse_enum_values(column_type: &str) -> Vec<String> {
    let Some(start) = column_type.find('(') else {
        return Vec::new();
    };
    let end = column_type.rfind(')').unwrap_or(column_type.len());
    if end <= start {
        return Vec::new();
    }

    let mut values = Vec::new();
    let mut chars = column_type[start + 1..end].chars().peekable();
    while let Some(c) = chars.next() {
        // Separators between quoted members
        if c != '\'' {
            continue;
        }

        let mut value = String::new();
        while let Some(c) = chars.next() {
            match c {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    value.push('\'');
                }
                '\'' => break,
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                }
                _ => value.push(c),
            }
        }
        values.push(value);
    }

    values
}
