//! Schema data structures
//!
//! These types represent database metadata and form the contract between
//! introspection (produces) and type generation (consumes).

use indexmap::IndexMap;

/// Enum type name to its member literals, in catalog declaration order
pub type EnumMap = IndexMap<String, Vec<String>>;

/// A table column as reported by the database catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Native type name; the element type for array columns
    pub database_type: String,
    pub is_nullable: bool,
    pub is_array: bool,
    /// Underlying type name, matched against enum names
    pub udt_name: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, database_type: impl Into<String>) -> Self {
        let database_type = database_type.into();
        Self {
            name: name.into(),
            udt_name: database_type.clone(),
            database_type,
            is_nullable: false,
            is_array: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self
    }

    pub fn with_udt_name(mut self, udt_name: impl Into<String>) -> Self {
        self.udt_name = udt_name.into();
        self
    }
}

/// Names that collide with TypeScript builtins when used as type aliases
const RESERVED_NAMES: &[&str] = &["string", "number", "package"];

/// Convert snake_case to PascalCase
///
/// This is a shared utility used by the type generators for table and enum
/// names.
pub fn to_pascal_case(s: &str) -> String {
    s.split(['_', '-', ' '])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => {
                    let first_upper = first.to_uppercase().to_string();
                    first_upper + chars.as_str()
                }
            }
        })
        .collect()
}

/// Convert snake_case to camelCase
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_pascal_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().to_string() + chars.as_str(),
    }
}

/// Make a name usable as a TypeScript identifier
///
/// Characters outside `[A-Za-z0-9_$]` become `_` and a leading digit gets a
/// `_` prefix. Reserved builtin names get a trailing `_`.
pub fn to_identifier(s: &str) -> String {
    let mut ident: String = s
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    if RESERVED_NAMES.contains(&ident.as_str()) {
        ident.push('_');
    }

    ident
}

/// Whether a name can be used unquoted as an interface property
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// TypeScript type name for a database enum
pub fn enum_type_name(enum_name: &str) -> String {
    to_identifier(&to_pascal_case(enum_name))
}
