//! Schema document assembly
//!
//! Reads tables and enums through a [`SchemaReader`], renders fragments with a
//! [`FragmentGenerator`] and joins them behind the generated file header.

use minijinja::{AutoEscape, Environment};
use tracing::{debug, info};

use crate::prelude::{EnumMap, FragmentGenerator, SchemaReader, SchematsError, DEFAULT_SCHEMA};
use crate::schema::to_identifier;

/// Written in place of a table interface the generator did not produce
pub const MISSING_FRAGMENT: &str = "undefined";

const NAMESPACE_INDENT: &str = "    ";

/// Inputs for one generated document
#[derive(Debug, Clone, Default)]
pub struct SchemaRequest {
    /// Wrap declarations in `export namespace <name>`
    pub namespace: Option<String>,
    /// Tables to generate; empty means every table in the schema
    pub tables: Vec<String>,
    /// Schema to read, `public` when unset
    pub schema: Option<String>,
    /// Redacted command shown in the header
    pub command: String,
    /// Generation time shown in the header
    pub timestamp: String,
}

impl SchemaRequest {
    pub fn new(command: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timestamp: timestamp.into(),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// Schema actually queried
    pub fn effective_schema(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

/// Generate the declarations for one table: field types, then interface
pub fn table_fragment<R, G>(
    reader: &mut R,
    generator: &G,
    table: &str,
    schema: &str,
    enums: &EnumMap,
) -> Result<String, SchematsError>
where
    R: SchemaReader + ?Sized,
    G: FragmentGenerator + ?Sized,
{
    let columns = reader.table_columns(table, schema)?;
    debug!(table = ?table, columns = columns.len(), "Read table columns");

    let mut fragment = generator.table_types(table, &columns, enums)?;
    match generator.table_interface(table, &columns, enums)? {
        Some(interface) => fragment.push_str(&interface),
        None => fragment.push_str(MISSING_FRAGMENT),
    }

    Ok(fragment)
}

/// Build the complete document for a schema
///
/// Enum discovery always runs, even when an explicit table list skips table
/// discovery. Any failed query aborts the whole document.
pub fn assemble_schema<R, G>(
    reader: &mut R,
    generator: &G,
    request: &SchemaRequest,
) -> Result<String, SchematsError>
where
    R: SchemaReader + ?Sized,
    G: FragmentGenerator + ?Sized,
{
    let schema = request.effective_schema();
    info!(schema = ?schema, namespace = ?request.namespace, "Assembling schema types");

    let tables = if request.tables.is_empty() {
        reader.list_tables(schema)?
    } else {
        debug!(tables = ?request.tables, "Using provided table list");
        request.tables.clone()
    };

    let enums = reader.enum_types(schema)?;
    debug!(count = enums.len(), "Found enum types");

    let mut table_fragments = String::new();
    for table in &tables {
        let fragment = table_fragment(&mut *reader, generator, table, schema, &enums)?;
        table_fragments.push_str(&fragment);
    }

    let enum_fragment = generator.enum_types(&enums)?;

    let mut output = render_header(&request.timestamp, &request.command)?;
    let body = format!("{}{}", enum_fragment, table_fragments);

    match &request.namespace {
        Some(namespace) => {
            output.push_str(&format!("export namespace {} {{\n", to_identifier(namespace)));
            output.push_str(&layout(&body, NAMESPACE_INDENT));
            output.push_str("}\n");
        }
        None => output.push_str(&layout(&body, "")),
    }

    info!(
        schema = ?schema,
        tables = tables.len(),
        enums = enums.len(),
        "Schema types assembled"
    );

    Ok(output)
}

/// Render the generated file header
pub fn render_header(timestamp: &str, command: &str) -> Result<String, SchematsError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let header_error = |e: minijinja::Error| SchematsError::CodeGen {
        table: "header".to_string(),
        message: format!("Template error: {}", e),
    };

    env.add_template("header", include_str!("templates/header.ts.jinja"))
        .map_err(header_error)?;

    env.get_template("header")
        .and_then(|template| {
            template.render(minijinja::context! {
                timestamp => timestamp,
                command => command,
            })
        })
        .map_err(header_error)
}

/// Emit body lines with the given indent
///
/// Leading blank lines are dropped and blank lines are never indented.
fn layout(body: &str, indent: &str) -> String {
    let mut out = String::with_capacity(body.len());
    for line in body.lines().skip_while(|line| line.trim().is_empty()) {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::codegen::{GeneratorOptions, TypeScriptGenerator};
    use crate::schema::ColumnDescriptor;

    const HEADER: &str = "\n\
        /* tslint:disable */\n\
        /**\n\
        \x20* AUTO-GENERATED FILE @ 2017-04-01 - DO NOT EDIT!\n\
        \x20*\n\
        \x20* This file was generated with schemats node package:\n\
        \x20* $ schemats testCommand\n\
        \x20*\n\
        \x20* Re-run the command above.\n\
        \x20*\n\
        \x20*/\n\
        \n";

    #[derive(Default)]
    struct MockReader {
        tables: Vec<String>,
        enums: EnumMap,
        columns: Vec<(String, Vec<ColumnDescriptor>)>,
        fail_table: Option<String>,
        list_tables_calls: Vec<String>,
        enum_types_calls: Vec<String>,
        table_columns_calls: Vec<(String, String)>,
    }

    impl MockReader {
        fn with_tables(tables: &[&str]) -> Self {
            Self {
                tables: tables.iter().map(|t| t.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    impl SchemaReader for MockReader {
        fn list_tables(&mut self, schema: &str) -> Result<Vec<String>, SchematsError> {
            self.list_tables_calls.push(schema.to_string());
            Ok(self.tables.clone())
        }

        fn enum_types(&mut self, schema: &str) -> Result<EnumMap, SchematsError> {
            self.enum_types_calls.push(schema.to_string());
            Ok(self.enums.clone())
        }

        fn table_columns(
            &mut self,
            table: &str,
            schema: &str,
        ) -> Result<Vec<ColumnDescriptor>, SchematsError> {
            self.table_columns_calls
                .push((table.to_string(), schema.to_string()));
            if self.fail_table.as_deref() == Some(table) {
                return Err(SchematsError::Connection("connection reset".to_string()));
            }
            Ok(self
                .columns
                .iter()
                .find(|(name, _)| name == table)
                .map(|(_, columns)| columns.clone())
                .unwrap_or_default())
        }
    }

    struct MockGenerator {
        enum_output: String,
        types_output: String,
        interface_output: Option<String>,
        enum_calls: RefCell<Vec<EnumMap>>,
        types_calls: RefCell<Vec<String>>,
        interface_calls: RefCell<Vec<String>>,
    }

    impl MockGenerator {
        fn new() -> Self {
            Self {
                enum_output: "generatedEnumTypes\n".to_string(),
                types_output: "generatedTableTypes\n".to_string(),
                interface_output: None,
                enum_calls: RefCell::new(Vec::new()),
                types_calls: RefCell::new(Vec::new()),
                interface_calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl FragmentGenerator for MockGenerator {
        fn enum_types(&self, enums: &EnumMap) -> Result<String, SchematsError> {
            self.enum_calls.borrow_mut().push(enums.clone());
            Ok(self.enum_output.clone())
        }

        fn table_types(
            &self,
            table: &str,
            _columns: &[ColumnDescriptor],
            _enums: &EnumMap,
        ) -> Result<String, SchematsError> {
            self.types_calls.borrow_mut().push(table.to_string());
            Ok(self.types_output.clone())
        }

        fn table_interface(
            &self,
            table: &str,
            _columns: &[ColumnDescriptor],
            _enums: &EnumMap,
        ) -> Result<Option<String>, SchematsError> {
            self.interface_calls.borrow_mut().push(table.to_string());
            Ok(self.interface_output.clone())
        }
    }

    fn enum_types() -> EnumMap {
        let mut enums = EnumMap::new();
        enums.insert("mood".to_string(), vec!["happy".to_string()]);
        enums
    }

    #[test]
    fn test_table_fragment_calls_reader_and_generator() {
        let mut reader = MockReader::default();
        let generator = MockGenerator::new();

        table_fragment(&mut reader, &generator, "tableName", "schemaName", &EnumMap::new())
            .unwrap();

        assert_eq!(
            reader.table_columns_calls,
            vec![("tableName".to_string(), "schemaName".to_string())]
        );
        assert_eq!(*generator.types_calls.borrow(), vec!["tableName"]);
        assert_eq!(*generator.interface_calls.borrow(), vec!["tableName"]);
    }

    #[test]
    fn test_table_fragment_merges_types_then_interface() {
        let mut reader = MockReader::default();
        let mut generator = MockGenerator::new();
        generator.interface_output = Some("generatedTableInterfaces\n".to_string());

        let fragment =
            table_fragment(&mut reader, &generator, "tableName", "schemaName", &EnumMap::new())
                .unwrap();

        assert_eq!(fragment, "generatedTableTypes\ngeneratedTableInterfaces\n");
    }

    #[test]
    fn test_schema_with_namespace() {
        let mut reader = MockReader::with_tables(&["tablename"]);
        reader.enums = enum_types();
        let generator = MockGenerator::new();
        let request = SchemaRequest::new("testCommand", "2017-04-01")
            .with_namespace(Some("namespace".to_string()));

        let output = assemble_schema(&mut reader, &generator, &request).unwrap();

        assert_eq!(reader.list_tables_calls, vec!["public"]);
        assert_eq!(reader.enum_types_calls, vec!["public"]);
        assert_eq!(*generator.enum_calls.borrow(), vec![enum_types()]);
        assert_eq!(*generator.types_calls.borrow(), vec!["tablename"]);
        assert_eq!(
            output,
            format!(
                "{}export namespace namespace {{\n    generatedEnumTypes\n    generatedTableTypes\n    undefined\n}}\n",
                HEADER
            )
        );
    }

    #[test]
    fn test_schema_with_schema_name() {
        let mut reader = MockReader::with_tables(&["tablename"]);
        reader.enums = enum_types();
        let generator = MockGenerator::new();
        let request = SchemaRequest::new("testCommand", "2017-04-01")
            .with_schema(Some("schemaName".to_string()));

        let output = assemble_schema(&mut reader, &generator, &request).unwrap();

        assert_eq!(reader.list_tables_calls, vec!["schemaName"]);
        assert_eq!(reader.enum_types_calls, vec!["schemaName"]);
        assert_eq!(
            reader.table_columns_calls,
            vec![("tablename".to_string(), "schemaName".to_string())]
        );
        assert_eq!(*generator.types_calls.borrow(), vec!["tablename"]);
        assert_eq!(
            output,
            format!("{}generatedEnumTypes\ngeneratedTableTypes\nundefined\n", HEADER)
        );
    }

    #[test]
    fn test_schema_with_tables_provided() {
        let mut reader = MockReader::with_tables(&["tablename"]);
        let generator = MockGenerator::new();
        let request = SchemaRequest::new("testCommand", "2017-04-01")
            .with_tables(vec!["differentTablename".to_string()]);

        let output = assemble_schema(&mut reader, &generator, &request).unwrap();

        assert!(reader.list_tables_calls.is_empty());
        assert_eq!(reader.enum_types_calls, vec!["public"]);
        assert_eq!(*generator.types_calls.borrow(), vec!["differentTablename"]);
        assert_eq!(
            output,
            format!("{}generatedEnumTypes\ngeneratedTableTypes\nundefined\n", HEADER)
        );
    }

    #[test]
    fn test_table_order_is_preserved() {
        let mut reader = MockReader::with_tables(&["zebra", "apple", "mango"]);
        let generator = MockGenerator::new();
        let request = SchemaRequest::new("testCommand", "2017-04-01");

        assemble_schema(&mut reader, &generator, &request).unwrap();

        assert_eq!(reader.list_tables_calls, vec!["public"]);
        assert_eq!(reader.enum_types_calls, vec!["public"]);
        assert_eq!(
            *generator.types_calls.borrow(),
            vec!["zebra", "apple", "mango"]
        );
    }

    #[test]
    fn test_failed_column_query_aborts() {
        let mut reader = MockReader::with_tables(&["first", "broken", "last"]);
        reader.fail_table = Some("broken".to_string());
        let generator = MockGenerator::new();
        let request = SchemaRequest::new("testCommand", "2017-04-01");

        let result = assemble_schema(&mut reader, &generator, &request);

        assert!(matches!(result, Err(SchematsError::Connection(_))));
        assert_eq!(reader.table_columns_calls.len(), 2);
        assert!(generator.enum_calls.borrow().is_empty());
    }

    #[test]
    fn test_header() {
        assert_eq!(render_header("2017-04-01", "testCommand").unwrap(), HEADER);
    }

    #[test]
    fn test_layout_indents_and_skips_leading_blank_lines() {
        assert_eq!(layout("\n\na\n\n b\n", "    "), "    a\n\n     b\n");
        assert_eq!(layout("", "    "), "");
    }

    #[test]
    fn test_typescript_document() {
        let mut reader = MockReader::with_tables(&["users"]);
        reader.enums = enum_types();
        reader.columns = vec![(
            "users".to_string(),
            vec![
                ColumnDescriptor::new("id", "int4"),
                ColumnDescriptor::new("mood", "mood").nullable(),
            ],
        )];
        let generator = TypeScriptGenerator::new(GeneratorOptions::default());
        let request = SchemaRequest::new("testCommand", "2017-04-01")
            .with_namespace(Some("db".to_string()));

        let output = assemble_schema(&mut reader, &generator, &request).unwrap();

        assert_eq!(
            output,
            format!(
                "{}export namespace db {{\n\
                 \x20   export type Mood = 'happy';\n\
                 \n\
                 \x20   export namespace usersFields {{\n\
                 \x20       export type id = number;\n\
                 \x20       export type mood = Mood | null;\n\
                 \x20   }}\n\
                 \n\
                 \x20   export interface users {{\n\
                 \x20       id: number;\n\
                 \x20       mood: Mood | null;\n\
                 \x20   }}\n\
                 }}\n",
                HEADER
            )
        );
    }
}
